//! インメモリ Repository 実装

pub mod chat_message;
pub mod room;

pub use chat_message::{DEFAULT_CHAT_RETENTION, InMemoryChatMessageRepository};
pub use room::InMemoryRoomRepository;
