//! Entities and Room Store outcomes.

use std::collections::BTreeSet;

use super::value_object::{ConnectionId, MessageContent, RoomCode, SenderName, Timestamp};

/// An ephemeral room.
///
/// Invariants: the host (while present) is a participant, and a room whose
/// participant set becomes empty is deleted by the Room Store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    /// `None` once the host has left; hosts are never migrated
    pub host: Option<ConnectionId>,
    pub participants: BTreeSet<ConnectionId>,
    pub created_at: Timestamp,
}

impl Room {
    /// Create a room whose only participant is its host
    pub fn new(code: RoomCode, host: ConnectionId, created_at: Timestamp) -> Self {
        let mut participants = BTreeSet::new();
        participants.insert(host.clone());
        Self {
            code,
            host: Some(host),
            participants,
            created_at,
        }
    }

    /// Returns `false` if the connection was already a participant
    pub fn add_participant(&mut self, connection_id: ConnectionId) -> bool {
        self.participants.insert(connection_id)
    }

    /// Returns `false` if the connection was not a participant.
    ///
    /// Removing the host vacates the host seat.
    pub fn remove_participant(&mut self, connection_id: &ConnectionId) -> bool {
        let removed = self.participants.remove(connection_id);
        if removed && self.is_host(connection_id) {
            self.host = None;
        }
        removed
    }

    pub fn is_host(&self, connection_id: &ConnectionId) -> bool {
        self.host.as_ref() == Some(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants.contains(connection_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// A persisted chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room_code: RoomCode,
    pub sender: SenderName,
    pub content: MessageContent,
    /// Server-assigned
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        room_code: RoomCode,
        sender: SenderName,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            room_code,
            sender,
            content,
            timestamp,
        }
    }
}

/// Effect of a connection leaving a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// The room survives with the given number of participants
    Updated {
        code: RoomCode,
        participant_count: usize,
    },
    /// The last participant left and the room was deleted
    Deleted { code: RoomCode },
}

impl MembershipChange {
    pub fn code(&self) -> &RoomCode {
        match self {
            Self::Updated { code, .. } | Self::Deleted { code } => code,
        }
    }
}

/// Result of a successful `create_room`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRoom {
    pub code: RoomCode,
    /// Room the creator had to leave first, if any
    pub left: Option<MembershipChange>,
}

/// Result of a successful `join_room`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub code: RoomCode,
    pub participant_count: usize,
    /// Room the joiner had to leave first, if any
    pub left: Option<MembershipChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn create_test_room(host: &str) -> Room {
        Room::new(
            RoomCode::new("ABC123".to_string()).unwrap(),
            connection(host),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_new_room_contains_only_host() {
        // テスト項目: 作成直後のルームはホストのみを参加者に持つ
        // given (前提条件):

        // when (操作):
        let room = create_test_room("a");

        // then (期待する結果):
        assert_eq!(room.participant_count(), 1);
        assert!(room.contains(&connection("a")));
        assert!(room.is_host(&connection("a")));
    }

    #[test]
    fn test_add_participant_is_idempotent() {
        // テスト項目: 同じ参加者を二度追加しても人数は増えない
        // given (前提条件):
        let mut room = create_test_room("a");

        // when (操作):
        let first = room.add_participant(connection("b"));
        let second = room.add_participant(connection("b"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(room.participant_count(), 2);
    }

    #[test]
    fn test_removing_host_vacates_host_seat() {
        // テスト項目: ホストが抜けるとホスト席は空になり、移譲されない
        // given (前提条件):
        let mut room = create_test_room("a");
        room.add_participant(connection("b"));

        // when (操作):
        let removed = room.remove_participant(&connection("a"));

        // then (期待する結果):
        assert!(removed);
        assert_eq!(room.host, None);
        assert!(!room.is_host(&connection("b")));
        assert_eq!(room.participant_count(), 1);
    }

    #[test]
    fn test_remove_unknown_participant_is_noop() {
        // テスト項目: 参加していない接続を削除しても状態は変わらない
        // given (前提条件):
        let mut room = create_test_room("a");

        // when (操作):
        let removed = room.remove_participant(&connection("z"));

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(room.participant_count(), 1);
        assert!(room.is_host(&connection("a")));
    }
}
