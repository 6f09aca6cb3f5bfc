//! WebSocket event protocol.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`. Events without a payload omit
//! `data`. Event names and payload field names are part of the public
//! protocol surface and are kept stable for existing clients.

use serde::{Deserialize, Serialize};

/// Number of chat messages returned by a history request.
pub const CHAT_HISTORY_LIMIT: usize = 50;

// ========================================
// Client → Server
// ========================================

/// Events sent by clients to the relay server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Create a room with the given code (empty code lets the server generate one)
    CreateRoom(String),
    JoinRoom(JoinRoomPayload),
    /// Host started playback
    Play(String),
    /// Host paused playback
    Pause(String),
    Seek(SeekPayload),
    /// Periodic host position heartbeat
    TimeUpdate(TimeUpdatePayload),
    /// Follower asks the host for the authoritative playback state
    RequestSync(String),
    /// Host answers a sync request for one follower
    HostUpdate(HostUpdatePayload),
    SendMessage(SendMessagePayload),
    RequestChatHistory(String),
}

impl ClientEvent {
    /// Parse a text frame into a client event.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize the event into a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Protocol name of the event, as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => "create_room",
            Self::JoinRoom(_) => "join_room",
            Self::Play(_) => "play",
            Self::Pause(_) => "pause",
            Self::Seek(_) => "seek",
            Self::TimeUpdate(_) => "time_update",
            Self::RequestSync(_) => "request_sync",
            Self::HostUpdate(_) => "host_update",
            Self::SendMessage(_) => "send_message",
            Self::RequestChatHistory(_) => "request_chat_history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_code: String,
    #[serde(default)]
    pub is_host: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeekPayload {
    pub room_code: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeUpdatePayload {
    pub room_code: String,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUpdatePayload {
    pub room_code: String,
    /// Connection id of the follower that asked for the sync
    pub client_id: String,
    pub is_playing: bool,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub room_code: String,
    pub sender: String,
    pub content: String,
}

// ========================================
// Server → Client
// ========================================

/// Events pushed by the relay server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection identity assigned on upgrade
    Connected(String),
    RoomCreated(String),
    /// `create_room` rejected because the code is taken by a live room
    RoomExists(String),
    InvalidRoom,
    /// Current participant count of the room
    RoomUpdate(usize),
    HostPlay,
    HostPause,
    HostSeek(f64),
    HostTimeUpdate(f64),
    /// Forwarded to the host; carries the requesting follower's connection id
    RequestSync(String),
    ForceSync(ForceSyncPayload),
    ReceiveMessage(ReceivedMessage),
    ChatHistory(Vec<ChatHistoryEntry>),
    Error(ErrorPayload),
}

impl ServerEvent {
    /// Parse a text frame into a server event.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize the event into a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Protocol name of the event, as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::RoomCreated(_) => "room_created",
            Self::RoomExists(_) => "room_exists",
            Self::InvalidRoom => "invalid_room",
            Self::RoomUpdate(_) => "room_update",
            Self::HostPlay => "host_play",
            Self::HostPause => "host_pause",
            Self::HostSeek(_) => "host_seek",
            Self::HostTimeUpdate(_) => "host_time_update",
            Self::RequestSync(_) => "request_sync",
            Self::ForceSync(_) => "force_sync",
            Self::ReceiveMessage(_) => "receive_message",
            Self::ChatHistory(_) => "chat_history",
            Self::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceSyncPayload {
    pub is_playing: bool,
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub sender: String,
    pub content: String,
    /// Server-assigned RFC 3339 timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryEntry {
    pub room_code: String,
    pub sender: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub reason: String,
}

impl ErrorPayload {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
