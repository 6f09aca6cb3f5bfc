//! ルーム単位のファンアウト
//!
//! 「ルーム全員へ」「1 接続へ」「送信者以外へ」の送信を 1 つのプリミティブ
//! `broadcast_to_room` に集約します。イベントの JSON 化もここで 1 回だけ行います。
//!
//! 参加・退出・作成は `lock_membership` のガードを保持したまま Room Store の変更と
//! room_update の送信キュー投入を行います。これにより、各メンバーが最後に受け取る
//! room_update は常にその時点のルームの人数と一致します。

use std::sync::Arc;

use syncme_shared::protocol::ServerEvent;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    ConnectionId, MembershipChange, MessagePushError, MessagePusher, RoomCode, RoomRepository,
};

/// ルームへのブロードキャスト
pub struct RoomBroadcaster {
    /// Repository（メンバー解決に使用）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// メンバー変更とその通知を直列化する
    membership: Mutex<()>,
}

impl RoomBroadcaster {
    /// 新しい RoomBroadcaster を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            membership: Mutex::new(()),
        }
    }

    /// メンバー変更の直列化ガードを取得
    ///
    /// ガードを保持している間に Room Store の変更と room_update の送信を行うこと。
    /// 送信はキューへの投入のみで完了するため、保持時間は短い。
    pub async fn lock_membership(&self) -> MutexGuard<'_, ()> {
        self.membership.lock().await
    }

    /// ルームのメンバーにイベントを送信
    ///
    /// # Arguments
    ///
    /// * `code` - 送信先ルーム
    /// * `event` - 送信するイベント
    /// * `exclude` - 送信対象から除外する接続（送信者など）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 実際に届いた接続数
    /// * `Err(MessagePushError)` - イベントのシリアライズ失敗
    pub async fn broadcast_to_room(
        &self,
        code: &RoomCode,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<usize, MessagePushError> {
        let payload = encode(event)?;
        let targets: Vec<ConnectionId> = self
            .repository
            .members(code)
            .await
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();

        let delivered = self.message_pusher.broadcast(&targets, &payload).await?;
        tracing::debug!(
            "Broadcasted '{}' to {}/{} member(s) of room '{}'",
            event.name(),
            delivered,
            targets.len(),
            code
        );
        Ok(delivered)
    }

    /// 1 つの接続にイベントを送信
    pub async fn send_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let payload = encode(event)?;
        self.message_pusher.push_to(connection_id, &payload).await
    }

    /// 退出によるメンバー変化を通知（削除されたルームには何も送らない）
    pub async fn notify_membership_change(&self, change: &MembershipChange) {
        match change {
            MembershipChange::Updated {
                code,
                participant_count,
            } => {
                let event = ServerEvent::RoomUpdate(*participant_count);
                if let Err(e) = self.broadcast_to_room(code, &event, None).await {
                    tracing::warn!("Failed to broadcast room_update for '{}': {}", code, e);
                }
            }
            MembershipChange::Deleted { code } => {
                tracing::info!("Room '{}' closed", code);
            }
        }
    }
}

fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
    event
        .to_json()
        .map_err(|e| MessagePushError::Serialization(e.to_string()))
}
