//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - `RoomRepository`: Room Store。プロセス内で唯一の共有可変状態であり、
//!   全ての変更はこの trait の操作を通して直列化されます。
//! - `ChatMessageRepository`: チャット履歴の永続化コラボレータ。

use async_trait::async_trait;

use super::{
    ChatMessage, ConnectionId, CreatedRoom, JoinedRoom, MembershipChange, RepositoryError, Room,
    RoomCode, RoomError, Timestamp,
};

/// Room Store trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
/// 1 つの接続が同時に所属できるルームは最大 1 つ。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを作成し、作成者をホスト兼唯一の参加者にする
    ///
    /// `code` が `None` の場合は稼働中のルームと重複しないコードを生成する。
    /// 作成者が別のルームに所属していた場合は先にそのルームから退出させる。
    ///
    /// # Errors
    ///
    /// * `RoomError::DuplicateRoomCode` - 稼働中のルームが同じコードを使用している（状態は変更しない）
    async fn create_room(
        &self,
        code: Option<RoomCode>,
        host: ConnectionId,
        created_at: Timestamp,
    ) -> Result<CreatedRoom, RoomError>;

    /// ルームに参加する
    ///
    /// `is_host` が真かつ呼び出し元が記録上のホストである場合は参加者の追加を行わない。
    /// 別のルームに所属していた場合は先にそのルームから退出させる。
    ///
    /// # Errors
    ///
    /// * `RoomError::RoomNotFound` - ルームが存在しない（状態は変更しない）
    async fn join_room(
        &self,
        code: &RoomCode,
        connection_id: ConnectionId,
        is_host: bool,
    ) -> Result<JoinedRoom, RoomError>;

    /// 接続が所属する全てのルームから退出させる
    ///
    /// 参加者が 0 人になったルームは削除される。所属がない場合は空のリストを返す（冪等）。
    async fn leave(&self, connection_id: &ConnectionId) -> Vec<MembershipChange>;

    /// ルームのホストを取得（ホスト不在またはルームが存在しない場合は `None`）
    async fn get_host(&self, code: &RoomCode) -> Option<ConnectionId>;

    /// 接続が現在所属しているルームのコードを取得
    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomCode>;

    /// ルームの参加者一覧を取得（ルームが存在しない場合は空）
    async fn members(&self, code: &RoomCode) -> Vec<ConnectionId>;

    /// ルームのスナップショットを取得
    async fn get_room(&self, code: &RoomCode) -> Option<Room>;

    /// 稼働中の全ルームのスナップショットを取得（コード順）
    async fn list_rooms(&self) -> Vec<Room>;
}

/// チャット履歴の永続化コラボレータ
///
/// 保持期間は実装側の責務。リレーは常に直近 `limit` 件のみを要求する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    /// メッセージを保存
    async fn insert(&self, message: ChatMessage) -> Result<(), RepositoryError>;

    /// ルームの直近 `limit` 件をタイムスタンプ昇順で取得（メッセージがなければ空）
    async fn find_recent(
        &self,
        room_code: &RoomCode,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
