//! Domain layer for the room relay.
//!
//! This module contains business types and the interfaces the use case layer
//! depends on. It is independent of DTOs and of concrete infrastructure.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, CreatedRoom, JoinedRoom, MembershipChange, Room};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{ChatMessageRepository, RoomRepository};
pub use value_object::{
    ConnectionId, MessageContent, PlaybackPosition, RoomCode, RoomCodeFactory, SenderName,
    Timestamp,
};
