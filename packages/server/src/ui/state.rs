//! Server state shared by every handler.

use std::sync::Arc;

use syncme_shared::time::Clock;

use crate::{
    domain::{ChatMessageRepository, MessagePusher, RoomRepository},
    usecase::{
        ChatHistoryUseCase, ConnectClientUseCase, CreateRoomUseCase, DisconnectClientUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, PlaybackSyncUseCase,
        RoomBroadcaster, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（クライアント接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// PlaybackSyncUseCase（再生同期のユースケース）
    pub playback_sync_usecase: Arc<PlaybackSyncUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// ChatHistoryUseCase（チャット履歴取得のユースケース）
    pub chat_history_usecase: Arc<ChatHistoryUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// 呼び出し元のみへの返信に使用
    pub broadcaster: Arc<RoomBroadcaster>,
}

impl AppState {
    /// Wire every use case from the shared collaborators
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        chat_repository: Arc<dyn ChatMessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let broadcaster = Arc::new(RoomBroadcaster::new(
            repository.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(message_pusher.clone())),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                repository.clone(),
                message_pusher,
                broadcaster.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                broadcaster.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                broadcaster.clone(),
            )),
            playback_sync_usecase: Arc::new(PlaybackSyncUseCase::new(
                repository.clone(),
                broadcaster.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                chat_repository.clone(),
                broadcaster.clone(),
                clock,
            )),
            chat_history_usecase: Arc::new(ChatHistoryUseCase::new(chat_repository)),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            broadcaster,
        }
    }
}
