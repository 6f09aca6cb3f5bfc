//! Domain errors.

use thiserror::Error;

/// Validation failures when constructing value objects
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueObjectError {
    #[error("Connection id must not be empty")]
    ConnectionIdEmpty,

    #[error("Room code must not be empty")]
    RoomCodeEmpty,

    #[error("Room code is too long ({0} characters)")]
    RoomCodeTooLong(usize),

    #[error("Sender name must not be empty")]
    SenderNameEmpty,

    #[error("Sender name is too long ({0} characters)")]
    SenderNameTooLong(usize),

    #[error("Message content must not be empty")]
    MessageContentEmpty,

    #[error("Message content is too long ({0} characters)")]
    MessageContentTooLong(usize),

    #[error("Playback position must be a finite, non-negative number of seconds (got {0})")]
    InvalidPlaybackPosition(f64),
}

/// Room Store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room '{0}' already exists")]
    DuplicateRoomCode(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// Persistence collaborator failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Chat store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound delivery failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to serialize event: {0}")]
    Serialization(String),
}
