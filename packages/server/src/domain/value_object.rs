//! Value objects.
//!
//! Every value object validates on construction, so holding one means the
//! value already satisfies the protocol's limits.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a room code (characters)
pub const MAX_ROOM_CODE_LENGTH: usize = 64;
/// Length of server-generated room codes
pub const GENERATED_ROOM_CODE_LENGTH: usize = 6;
/// Maximum length of a sender display name (characters)
pub const MAX_SENDER_NAME_LENGTH: usize = 50;
/// Maximum length of a chat message (characters)
pub const MAX_MESSAGE_CONTENT_LENGTH: usize = 1000;

// ========================================
// ConnectionId
// ========================================

/// Identity of one live transport connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(value))
    }

    /// Assign a fresh identity to a new connection
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// RoomCode
// ========================================

/// Opaque room code. Unique only among live rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(String);

impl RoomCode {
    /// Surrounding whitespace is trimmed; the rest is kept verbatim.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::RoomCodeEmpty);
        }
        let length = trimmed.chars().count();
        if length > MAX_ROOM_CODE_LENGTH {
            return Err(ValueObjectError::RoomCodeTooLong(length));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates candidate room codes (upper-case alphanumeric).
///
/// Uniqueness among live rooms is checked by the Room Store, not here.
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    pub fn generate() -> RoomCode {
        let code: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(GENERATED_ROOM_CODE_LENGTH)
            .collect();
        RoomCode(code.to_ascii_uppercase())
    }
}

// ========================================
// SenderName
// ========================================

/// Display name attached to chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderName(String);

impl SenderName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::SenderNameEmpty);
        }
        let length = trimmed.chars().count();
        if length > MAX_SENDER_NAME_LENGTH {
            return Err(ValueObjectError::SenderNameTooLong(length));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SenderName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ========================================
// MessageContent
// ========================================

/// Chat message body, bounded in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Content is stored as sent; only whitespace-only bodies are rejected.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let length = value.chars().count();
        if length > MAX_MESSAGE_CONTENT_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong(length));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ========================================
// Timestamp
// ========================================

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

// ========================================
// PlaybackPosition
// ========================================

/// Position in the media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PlaybackPosition(f64);

impl PlaybackPosition {
    pub fn new(seconds: f64) -> Result<Self, ValueObjectError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ValueObjectError::InvalidPlaybackPosition(seconds));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty() {
        // テスト項目: 空の接続 ID は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::ConnectionIdEmpty));
    }

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: 生成される接続 ID は毎回異なる
        // given (前提条件):

        // when (操作):
        let first = ConnectionId::generate();
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(!first.as_str().is_empty());
    }

    #[test]
    fn test_room_code_is_trimmed() {
        // テスト項目: ルームコードの前後の空白は取り除かれる
        // given (前提条件):
        let value = "  ABC123 ".to_string();

        // when (操作):
        let code = RoomCode::new(value).unwrap();

        // then (期待する結果):
        assert_eq!(code.as_str(), "ABC123");
    }

    #[test]
    fn test_room_code_length_limit() {
        // テスト項目: 上限を超える長さのルームコードは拒否される
        // given (前提条件):
        let at_limit = "a".repeat(MAX_ROOM_CODE_LENGTH);
        let over_limit = "a".repeat(MAX_ROOM_CODE_LENGTH + 1);

        // when (操作):
        let ok = RoomCode::new(at_limit);
        let err = RoomCode::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            err,
            Err(ValueObjectError::RoomCodeTooLong(MAX_ROOM_CODE_LENGTH + 1))
        );
        assert_eq!(
            RoomCode::new(String::new()),
            Err(ValueObjectError::RoomCodeEmpty)
        );
    }

    #[test]
    fn test_generated_room_code_shape() {
        // テスト項目: 生成されるルームコードは 6 文字の英大文字・数字
        // given (前提条件):

        // when (操作):
        let code = RoomCodeFactory::generate();

        // then (期待する結果):
        assert_eq!(code.as_str().len(), GENERATED_ROOM_CODE_LENGTH);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_sender_name_validation() {
        // テスト項目: 送信者名は空白のみや長すぎる値を拒否する
        // given (前提条件):
        let too_long = "n".repeat(MAX_SENDER_NAME_LENGTH + 1);

        // when (操作):
        let empty = SenderName::new(" ".to_string());
        let long = SenderName::new(too_long);
        let ok = SenderName::new(" B ".to_string());

        // then (期待する結果):
        assert_eq!(empty, Err(ValueObjectError::SenderNameEmpty));
        assert_eq!(
            long,
            Err(ValueObjectError::SenderNameTooLong(MAX_SENDER_NAME_LENGTH + 1))
        );
        assert_eq!(ok.unwrap().as_str(), "B");
    }

    #[test]
    fn test_message_content_validation() {
        // テスト項目: メッセージ本文は空白のみや上限超過を拒否し、それ以外はそのまま保持する
        // given (前提条件):
        let max = "x".repeat(MAX_MESSAGE_CONTENT_LENGTH);
        let over = "x".repeat(MAX_MESSAGE_CONTENT_LENGTH + 1);

        // when (操作):
        let blank = MessageContent::new("\n\t ".to_string());
        let at_max = MessageContent::new(max);
        let too_long = MessageContent::new(over);
        let padded = MessageContent::new(" hi ".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(blank, Err(ValueObjectError::MessageContentEmpty));
        assert!(at_max.is_ok());
        assert_eq!(
            too_long,
            Err(ValueObjectError::MessageContentTooLong(
                MAX_MESSAGE_CONTENT_LENGTH + 1
            ))
        );
        assert_eq!(padded.as_str(), " hi ");
    }

    #[test]
    fn test_message_content_counts_characters_not_bytes() {
        // テスト項目: 長さの上限はバイト数ではなく文字数で判定される
        // given (前提条件):
        let multibyte = "あ".repeat(MAX_MESSAGE_CONTENT_LENGTH);

        // when (操作):
        let result = MessageContent::new(multibyte);

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_playback_position_rejects_negative_and_non_finite() {
        // テスト項目: 再生位置は有限かつ 0 以上のみ許可される
        // given (前提条件):

        // when (操作):
        let zero = PlaybackPosition::new(0.0);
        let negative = PlaybackPosition::new(-1.0);
        let nan = PlaybackPosition::new(f64::NAN);
        let inf = PlaybackPosition::new(f64::INFINITY);

        // then (期待する結果):
        assert_eq!(zero.unwrap().seconds(), 0.0);
        assert!(negative.is_err());
        assert!(nan.is_err());
        assert!(inf.is_err());
    }
}
