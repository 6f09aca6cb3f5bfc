//! Conversion logic between domain entities and DTOs.

use syncme_shared::{
    protocol::{ChatHistoryEntry, ReceivedMessage},
    time::timestamp_to_rfc3339,
};

use crate::domain::entity;
use crate::infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<entity::ChatMessage> for ReceivedMessage {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            sender: model.sender.into_string(),
            content: model.content.into_string(),
            timestamp: timestamp_to_rfc3339(model.timestamp.value()),
        }
    }
}

impl From<entity::ChatMessage> for ChatHistoryEntry {
    fn from(model: entity::ChatMessage) -> Self {
        Self {
            room_code: model.room_code.into_string(),
            sender: model.sender.into_string(),
            content: model.content.into_string(),
            timestamp: timestamp_to_rfc3339(model.timestamp.value()),
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<entity::Room> for RoomSummaryDto {
    fn from(model: entity::Room) -> Self {
        Self {
            participant_count: model.participant_count(),
            code: model.code.into_string(),
            host: model.host.map(|host| host.into_string()),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<entity::Room> for RoomDetailDto {
    fn from(model: entity::Room) -> Self {
        Self {
            code: model.code.into_string(),
            host: model.host.map(|host| host.into_string()),
            participants: model
                .participants
                .into_iter()
                .map(|id| id.into_string())
                .collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, MessageContent, RoomCode, SenderName, Timestamp};

    fn create_test_message() -> entity::ChatMessage {
        entity::ChatMessage::new(
            RoomCode::new("ABC123".to_string()).unwrap(),
            SenderName::new("B".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        )
    }

    #[test]
    fn test_domain_chat_message_to_received_message() {
        // テスト項目: ドメインの ChatMessage が receive_message のペイロードに変換される
        // given (前提条件):
        let message = create_test_message();

        // when (操作):
        let dto: ReceivedMessage = message.into();

        // then (期待する結果):
        assert_eq!(dto.sender, "B");
        assert_eq!(dto.content, "hi");
        assert_eq!(dto.timestamp, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_domain_chat_message_to_history_entry() {
        // テスト項目: ドメインの ChatMessage が履歴エントリに変換され、ルームコードを保持する
        // given (前提条件):
        let message = create_test_message();

        // when (操作):
        let dto: ChatHistoryEntry = message.into();

        // then (期待する結果):
        assert_eq!(dto.room_code, "ABC123");
        assert_eq!(dto.sender, "B");
    }

    #[test]
    fn test_domain_room_to_summary_and_detail() {
        // テスト項目: ドメインの Room が一覧・詳細 DTO に変換される
        // given (前提条件):
        let mut room = entity::Room::new(
            RoomCode::new("ABC123".to_string()).unwrap(),
            ConnectionId::new("a".to_string()).unwrap(),
            Timestamp::new(1672531200000),
        );
        room.add_participant(ConnectionId::new("b".to_string()).unwrap());

        // when (操作):
        let summary: RoomSummaryDto = room.clone().into();
        let detail: RoomDetailDto = room.into();

        // then (期待する結果):
        assert_eq!(summary.participant_count, 2);
        assert_eq!(summary.host.as_deref(), Some("a"));
        assert_eq!(detail.participants, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(detail.created_at, "2023-01-01T00:00:00.000Z");
    }
}
