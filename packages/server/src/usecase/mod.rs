//! UseCase layer.
//!
//! Each use case depends only on the domain traits; the UI layer turns their
//! results into caller-only replies.

pub mod broadcast;
pub mod chat_history;
pub mod connect_client;
pub mod create_room;
pub mod disconnect_client;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod playback_sync;
pub mod send_message;

pub use broadcast::RoomBroadcaster;
pub use chat_history::ChatHistoryUseCase;
pub use connect_client::ConnectClientUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{
    ChatHistoryError, CreateRoomError, GetRoomDetailError, JoinRoomError, SendMessageError,
    SyncError,
};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use playback_sync::{PlaybackCommand, PlaybackSyncUseCase};
pub use send_message::{SendMessageUseCase, SentMessage};
