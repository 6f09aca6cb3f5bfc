//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加後、参加者を含むルーム全員に新しい人数の room_update が届くこと
//!
//! ### なぜこのテストが必要か
//! - 存在しないルームへの参加は状態を変えずに呼び出し元だけに invalid_room を返す必要がある
//! - ホストの再参加（isHost）で人数が増えないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加と room_update の配信
//! - 異常系：存在しないルーム、不正なコード
//! - エッジケース：ホストの再参加
//! - 並行性：参加・切断が重なっても room_update が実際の人数の順に届くこと

use std::sync::Arc;

use syncme_shared::protocol::ServerEvent;

use crate::domain::{ConnectionId, JoinedRoom, RoomCode, RoomError, RoomRepository};

use super::{broadcast::RoomBroadcaster, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// ルームへのブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `raw_code` - 参加先のルームコード
    /// * `is_host` - ホストとしての再参加を主張するか（記録上のホストの場合のみ有効）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        raw_code: &str,
        is_host: bool,
    ) -> Result<JoinedRoom, JoinRoomError> {
        // 形式として不正なコードも「存在しないルーム」として扱う
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| JoinRoomError::RoomNotFound(raw_code.to_string()))?;

        let _membership = self.broadcaster.lock_membership().await;
        let joined = self
            .repository
            .join_room(&code, connection_id.clone(), is_host)
            .await
            .map_err(|e| match e {
                RoomError::RoomNotFound(code) | RoomError::DuplicateRoomCode(code) => {
                    JoinRoomError::RoomNotFound(code)
                }
            })?;

        if let Some(left) = &joined.left {
            self.broadcaster.notify_membership_change(left).await;
        }

        let event = ServerEvent::RoomUpdate(joined.participant_count);
        if let Err(e) = self
            .broadcaster
            .broadcast_to_room(&joined.code, &event, None)
            .await
        {
            tracing::warn!(
                "Failed to broadcast room_update for '{}': {}",
                joined.code,
                e
            );
        }

        tracing::info!(
            "'{}' joined room '{}' ({} participant(s))",
            connection_id,
            joined.code,
            joined.participant_count
        );
        Ok(joined)
    }
}
