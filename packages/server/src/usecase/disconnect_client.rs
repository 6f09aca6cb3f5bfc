//! UseCase: クライアント切断処理（Connection Registry: onDisconnect）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 切断時に所属ルームから退出し、残りの参加者に room_update が届くこと
//!
//! ### なぜこのテストが必要か
//! - 切断は唯一のキャンセルシグナルであり、重複して届いても人数を二重に減らしてはならない
//! - 最後の参加者が切断したルームは削除されなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし、ルーム削除）
//! - エッジケース：二重切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MembershipChange, MessagePusher, RoomRepository};

use super::broadcast::RoomBroadcaster;

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（接続の登録解除に使用）
    message_pusher: Arc<dyn MessagePusher>,
    /// ルームへのブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<RoomBroadcaster>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            broadcaster,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 影響を受けたルームごとの変化（所属がなかった場合や二度目の呼び出しでは空）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<MembershipChange> {
        if !self.message_pusher.unregister_client(connection_id).await {
            tracing::debug!("Connection '{}' was already unregistered", connection_id);
        }

        let _membership = self.broadcaster.lock_membership().await;
        let changes = self.repository.leave(connection_id).await;
        for change in &changes {
            self.broadcaster.notify_membership_change(change).await;
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomCode, Timestamp},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use syncme_shared::protocol::ServerEvent;
    use tokio::sync::mpsc;

    struct Fixture {
        repository: Arc<InMemoryRoomRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: DisconnectClientUseCase,
    }

    fn create_fixture() -> Fixture {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let broadcaster = Arc::new(RoomBroadcaster::new(repository.clone(), pusher.clone()));
        let usecase = DisconnectClientUseCase::new(repository.clone(), pusher.clone(), broadcaster);
        Fixture {
            repository,
            pusher,
            usecase,
        }
    }

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn code(value: &str) -> RoomCode {
        RoomCode::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_disconnect_notifies_remaining_members() {
        // テスト項目: 切断すると残りの参加者に新しい人数の room_update が届く
        // given (前提条件):
        let fixture = create_fixture();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        fixture.pusher.register_client(connection("A"), tx_a).await;
        fixture.pusher.register_client(connection("B"), tx_b).await;
        fixture
            .repository
            .create_room(Some(code("ABC123")), connection("A"), Timestamp::new(0))
            .await
            .unwrap();
        fixture
            .repository
            .join_room(&code("ABC123"), connection("B"), false)
            .await
            .unwrap();

        // when (操作): B が切断
        let changes = fixture.usecase.execute(&connection("B")).await;

        // then (期待する結果):
        assert_eq!(
            changes,
            vec![MembershipChange::Updated {
                code: code("ABC123"),
                participant_count: 1
            }]
        );
        let received = rx_a.recv().await.unwrap();
        assert_eq!(
            ServerEvent::from_json(&received).unwrap(),
            ServerEvent::RoomUpdate(1)
        );
        assert_eq!(fixture.pusher.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_last_participant_deletes_room() {
        // テスト項目: 最後の参加者が切断するとルームが削除され、通知は送られない
        // given (前提条件):
        let fixture = create_fixture();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        fixture.pusher.register_client(connection("A"), tx_a).await;
        fixture
            .repository
            .create_room(Some(code("ABC123")), connection("A"), Timestamp::new(0))
            .await
            .unwrap();

        // when (操作):
        let changes = fixture.usecase.execute(&connection("A")).await;

        // then (期待する結果):
        assert_eq!(
            changes,
            vec![MembershipChange::Deleted {
                code: code("ABC123")
            }]
        );
        assert!(fixture.repository.list_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_disconnect_is_noop() {
        // テスト項目: 二重の切断イベントで人数が二重に減らず、通知も一度きり
        // given (前提条件):
        let fixture = create_fixture();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let (tx_c, _rx_c) = mpsc::unbounded_channel();
        fixture.pusher.register_client(connection("A"), tx_a).await;
        fixture.pusher.register_client(connection("B"), tx_b).await;
        fixture.pusher.register_client(connection("C"), tx_c).await;
        fixture
            .repository
            .create_room(Some(code("ABC123")), connection("A"), Timestamp::new(0))
            .await
            .unwrap();
        for id in ["B", "C"] {
            fixture
                .repository
                .join_room(&code("ABC123"), connection(id), false)
                .await
                .unwrap();
        }

        // when (操作):
        let first = fixture.usecase.execute(&connection("B")).await;
        let second = fixture.usecase.execute(&connection("B")).await;

        // then (期待する結果):
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(fixture.repository.members(&code("ABC123")).await.len(), 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_without_room() {
        // テスト項目: どのルームにも所属していない接続の切断は何も変更しない
        // given (前提条件):
        let fixture = create_fixture();
        let (tx, _rx) = mpsc::unbounded_channel();
        fixture.pusher.register_client(connection("lonely"), tx).await;

        // when (操作):
        let changes = fixture.usecase.execute(&connection("lonely")).await;

        // then (期待する結果):
        assert!(changes.is_empty());
        assert_eq!(fixture.pusher.connection_count().await, 0);
    }
}
