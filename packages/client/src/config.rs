//! Client configuration.

use std::time::Duration;

use crate::error::ClientError;

/// Default interval between host `time_update` heartbeats
pub const DEFAULT_HEARTBEAT_SECS: u64 = 5;
/// Default time a follower waits for `force_sync`
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 3;
/// Sync requests re-sent after the first one times out
pub const MAX_SYNC_RETRIES: u32 = 3;

/// Whether this client drives playback or follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Follower,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8000/ws`
    pub url: String,
    /// Room to create (host, optional) or join (follower, required)
    pub room: Option<String>,
    /// Display name attached to chat messages
    pub name: String,
    pub role: Role,
    pub heartbeat: Duration,
    pub sync_timeout: Duration,
    pub max_sync_retries: u32,
}

impl ClientConfig {
    /// Build and validate a configuration
    ///
    /// # Errors
    ///
    /// * `ClientError::Config` - a follower without a room, an empty name or a zero interval
    pub fn new(
        url: String,
        room: Option<String>,
        name: String,
        role: Role,
        heartbeat_secs: u64,
        sync_timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        let room = room
            .map(|room| room.trim().to_string())
            .filter(|room| !room.is_empty());
        if role == Role::Follower && room.is_none() {
            return Err(ClientError::Config(
                "--room is required unless --host-mode is set".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(ClientError::Config("--name must not be empty".to_string()));
        }
        if heartbeat_secs == 0 || sync_timeout_secs == 0 {
            return Err(ClientError::Config(
                "intervals must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            url,
            room,
            name: name.trim().to_string(),
            role,
            heartbeat: Duration::from_secs(heartbeat_secs),
            sync_timeout: Duration::from_secs(sync_timeout_secs),
            max_sync_retries: MAX_SYNC_RETRIES,
        })
    }
}
