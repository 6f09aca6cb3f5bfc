//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! ルーム表と「接続 → 所属ルーム」の索引を 1 つの Mutex の内側に置き、
//! 参加・退出を 1 回のロック取得で完結させます。
//!
//! 複数プロセスへ水平分割する場合は、同じ trait の裏側を外部の共有ストア
//! （KVS など）に差し替える必要があります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, CreatedRoom, JoinedRoom, MembershipChange, Room, RoomCode, RoomCodeFactory,
    RoomError, RoomRepository, Timestamp,
};

#[derive(Debug, Default)]
struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
    /// connection → room it belongs to (at most one)
    memberships: HashMap<ConnectionId, RoomCode>,
}

impl RoomStore {
    fn leave(&mut self, connection_id: &ConnectionId) -> Option<MembershipChange> {
        let code = self.memberships.remove(connection_id)?;
        let room = self.rooms.get_mut(&code)?;
        room.remove_participant(connection_id);

        if room.is_empty() {
            self.rooms.remove(&code);
            tracing::debug!("Room '{}' deleted (no participants left)", code);
            Some(MembershipChange::Deleted { code })
        } else {
            let participant_count = room.participant_count();
            Some(MembershipChange::Updated {
                code,
                participant_count,
            })
        }
    }

    /// Leave the current room unless it is `target`
    fn leave_other_than(
        &mut self,
        connection_id: &ConnectionId,
        target: &RoomCode,
    ) -> Option<MembershipChange> {
        match self.memberships.get(connection_id) {
            Some(current) if current != target => self.leave(connection_id),
            _ => None,
        }
    }

    fn generate_unique_code(&self) -> RoomCode {
        loop {
            let candidate = RoomCodeFactory::generate();
            if !self.rooms.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// インメモリ Room Repository 実装
///
/// プロセス起動時に生成し、終了まで保持します。状態は本質的に一時的なため後始末は不要です。
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    store: Mutex<RoomStore>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        code: Option<RoomCode>,
        host: ConnectionId,
        created_at: Timestamp,
    ) -> Result<CreatedRoom, RoomError> {
        let mut store = self.store.lock().await;

        let code = match code {
            Some(code) if store.rooms.contains_key(&code) => {
                return Err(RoomError::DuplicateRoomCode(code.into_string()));
            }
            Some(code) => code,
            None => store.generate_unique_code(),
        };

        let left = store.leave(&host);
        store
            .rooms
            .insert(code.clone(), Room::new(code.clone(), host.clone(), created_at));
        store.memberships.insert(host, code.clone());

        Ok(CreatedRoom { code, left })
    }

    async fn join_room(
        &self,
        code: &RoomCode,
        connection_id: ConnectionId,
        is_host: bool,
    ) -> Result<JoinedRoom, RoomError> {
        let mut store = self.store.lock().await;

        if !store.rooms.contains_key(code) {
            return Err(RoomError::RoomNotFound(code.as_str().to_string()));
        }

        let left = store.leave_other_than(&connection_id, code);

        let room = store
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.as_str().to_string()))?;
        if is_host && room.is_host(&connection_id) {
            tracing::debug!("Host '{}' rejoined room '{}'", connection_id, code);
        } else {
            if is_host {
                tracing::warn!(
                    "'{}' claimed host of room '{}' but is not its host; joining as follower",
                    connection_id,
                    code
                );
            }
            room.add_participant(connection_id.clone());
        }
        let participant_count = room.participant_count();
        store.memberships.insert(connection_id, code.clone());

        Ok(JoinedRoom {
            code: code.clone(),
            participant_count,
            left,
        })
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Vec<MembershipChange> {
        let mut store = self.store.lock().await;
        store.leave(connection_id).into_iter().collect()
    }

    async fn get_host(&self, code: &RoomCode) -> Option<ConnectionId> {
        let store = self.store.lock().await;
        store.rooms.get(code).and_then(|room| room.host.clone())
    }

    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomCode> {
        let store = self.store.lock().await;
        store.memberships.get(connection_id).cloned()
    }

    async fn members(&self, code: &RoomCode) -> Vec<ConnectionId> {
        let store = self.store.lock().await;
        store
            .rooms
            .get(code)
            .map(|room| room.participants.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn get_room(&self, code: &RoomCode) -> Option<Room> {
        let store = self.store.lock().await;
        store.rooms.get(code).cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let store = self.store.lock().await;
        let mut rooms: Vec<Room> = store.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.code.cmp(&b.code));
        rooms
    }
}
