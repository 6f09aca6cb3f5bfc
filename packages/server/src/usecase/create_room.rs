//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - 指定コード・自動生成コードでのルーム作成、重複コードの拒否
//!
//! ### どのような状況を想定しているか
//! - 正常系：コードを指定して作成、空コードで自動生成
//! - 異常系：既存のコードと重複
//! - エッジケース：別のルームに所属したまま作成（旧ルームへ room_update）

use std::sync::Arc;

use syncme_shared::time::Clock;

use crate::domain::{ConnectionId, RoomCode, RoomError, RoomRepository, Timestamp};

use super::{broadcast::RoomBroadcaster, error::CreateRoomError};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// ルームへのブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
    /// 作成時刻の取得
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            clock,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - ホストとなる接続
    /// * `raw_code` - 希望するルームコード（空または空白のみの場合はサーバーが生成）
    ///
    /// # Returns
    ///
    /// * `Ok(RoomCode)` - 作成されたルームのコード
    /// * `Err(CreateRoomError)` - コードが不正、または既存のルームと重複
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        raw_code: &str,
    ) -> Result<RoomCode, CreateRoomError> {
        let requested = if raw_code.trim().is_empty() {
            None
        } else {
            Some(RoomCode::new(raw_code.to_string()).map_err(CreateRoomError::InvalidRoomCode)?)
        };

        let created_at = Timestamp::new(self.clock.now_millis());
        let _membership = self.broadcaster.lock_membership().await;
        let created = self
            .repository
            .create_room(requested, connection_id.clone(), created_at)
            .await
            .map_err(|e| match e {
                RoomError::DuplicateRoomCode(code) | RoomError::RoomNotFound(code) => {
                    CreateRoomError::DuplicateRoomCode(code)
                }
            })?;

        if let Some(left) = &created.left {
            self.broadcaster.notify_membership_change(left).await;
        }

        tracing::info!("Room '{}' created by '{}'", created.code, connection_id);
        Ok(created.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessagePusher, value_object::GENERATED_ROOM_CODE_LENGTH},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use syncme_shared::{protocol::ServerEvent, time::FixedClock};
    use tokio::sync::mpsc;

    struct Fixture {
        repository: Arc<InMemoryRoomRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: CreateRoomUseCase,
    }

    fn create_fixture() -> Fixture {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let broadcaster = Arc::new(RoomBroadcaster::new(repository.clone(), pusher.clone()));
        let usecase = CreateRoomUseCase::new(
            repository.clone(),
            broadcaster,
            Arc::new(FixedClock::new(1_700_000_000_000)),
        );
        Fixture {
            repository,
            pusher,
            usecase,
        }
    }

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_with_requested_code() {
        // テスト項目: 指定したコードでルームが作成され、作成者がホストになる
        // given (前提条件):
        let fixture = create_fixture();

        // when (操作):
        let result = fixture.usecase.execute(connection("A"), "ABC123").await;

        // then (期待する結果):
        let code = result.unwrap();
        assert_eq!(code.as_str(), "ABC123");
        let room = fixture.repository.get_room(&code).await.unwrap();
        assert!(room.is_host(&connection("A")));
        assert_eq!(room.participant_count(), 1);
        assert_eq!(room.created_at, Timestamp::new(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_create_room_with_empty_code_generates_one() {
        // テスト項目: 空白のみのコードを指定するとサーバーがコードを生成する
        // given (前提条件):
        let fixture = create_fixture();

        // when (操作):
        let code = fixture.usecase.execute(connection("A"), "  ").await.unwrap();

        // then (期待する結果):
        assert_eq!(code.as_str().len(), GENERATED_ROOM_CODE_LENGTH);
        assert!(fixture.repository.get_room(&code).await.is_some());
    }

    #[tokio::test]
    async fn test_create_room_duplicate_code_fails() {
        // テスト項目: 既存のルームと同じコードでは作成できず、既存ルームは変化しない
        // given (前提条件):
        let fixture = create_fixture();
        fixture
            .usecase
            .execute(connection("A"), "ABC123")
            .await
            .unwrap();

        // when (操作):
        let result = fixture.usecase.execute(connection("B"), "ABC123").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(CreateRoomError::DuplicateRoomCode("ABC123".to_string()))
        );
        let room = fixture
            .repository
            .get_room(&RoomCode::new("ABC123".to_string()).unwrap())
            .await
            .unwrap();
        assert!(room.is_host(&connection("A")));
        assert_eq!(room.participant_count(), 1);
    }

    #[tokio::test]
    async fn test_create_room_rejects_overlong_code() {
        // テスト項目: 上限を超える長さのコードは InvalidRoomCode になる
        // given (前提条件):
        let fixture = create_fixture();

        // when (操作):
        let result = fixture
            .usecase
            .execute(connection("A"), &"X".repeat(100))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(CreateRoomError::InvalidRoomCode(_))));
        assert!(fixture.repository.list_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_room_while_in_other_room_notifies_previous() {
        // テスト項目: 別ルームに所属したまま作成すると旧ルームから退出し、残りの参加者に通知される
        // given (前提条件):
        let fixture = create_fixture();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        fixture.pusher.register_client(connection("B"), tx_b).await;
        fixture
            .usecase
            .execute(connection("B"), "OLD")
            .await
            .unwrap();
        fixture
            .repository
            .join_room(
                &RoomCode::new("OLD".to_string()).unwrap(),
                connection("A"),
                false,
            )
            .await
            .unwrap();

        // when (操作): A が新しいルームを作成
        fixture
            .usecase
            .execute(connection("A"), "NEW")
            .await
            .unwrap();

        // then (期待する結果):
        let received = rx_b.recv().await.unwrap();
        assert_eq!(
            ServerEvent::from_json(&received).unwrap(),
            ServerEvent::RoomUpdate(1)
        );
        assert_eq!(
            fixture.repository.current_room(&connection("A")).await,
            Some(RoomCode::new("NEW".to_string()).unwrap())
        );
    }
}
