//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{MessagePushError, RepositoryError, ValueObjectError};

/// `create_room` のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreateRoomError {
    #[error("Invalid room code: {0}")]
    InvalidRoomCode(ValueObjectError),

    #[error("Room '{0}' already exists")]
    DuplicateRoomCode(String),
}

/// `join_room` のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    /// 呼び出し元にのみ `invalid_room` を返す
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// 再生同期のエラー
///
/// いずれも該当する接続・ルームに閉じた失敗で、呼び出し元へのシグナルは返さない。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("Connection is not in room '{0}'")]
    NotInRoom(String),

    #[error("Only the host of room '{0}' may control playback")]
    NotHost(String),

    #[error("Room '{0}' has no reachable host")]
    NoHostAvailable(String),

    #[error("Follower '{0}' is not in the host's room")]
    FollowerNotInRoom(String),

    #[error("Invalid playback position: {0}")]
    InvalidPosition(ValueObjectError),

    #[error("Invalid connection id: {0}")]
    InvalidConnectionId(ValueObjectError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

/// `send_message` のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SendMessageError {
    #[error("Room '{0}' not found or sender is not a member")]
    NotInRoom(String),

    #[error("Invalid sender: {0}")]
    InvalidSender(ValueObjectError),

    #[error("Invalid content: {0}")]
    InvalidContent(ValueObjectError),

    #[error(transparent)]
    Broadcast(#[from] MessagePushError),
}

/// チャット履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatHistoryError {
    #[error("Invalid room code: {0}")]
    InvalidRoomCode(ValueObjectError),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}
