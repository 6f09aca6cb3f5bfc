//! Error types for the syncme client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The room to follow does not exist
    #[error("Room '{0}' does not exist")]
    RoomNotFound(String),

    /// The room code is already taken by a live room
    #[error("Room '{0}' already exists")]
    RoomExists(String),

    /// Invalid command line configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
