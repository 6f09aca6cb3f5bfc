//! UseCase: チャットメッセージ送信処理（Chat Relay）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの保存と、送信者を含むルーム全員への receive_message 配信
//!
//! ### なぜこのテストが必要か
//! - 永続化の失敗がリアルタイム配信を止めてはならない
//! - 保存順と配信順が一致し、同一ルーム内のタイムスタンプが単調増加であることを保証する
//! - 空・長すぎるメッセージや非参加者からの送信を拒否する
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存と配信
//! - 異常系：入力値の不正、非参加者からの送信
//! - エッジケース：永続化の失敗（配信は続行）、時計の巻き戻り
//! - 並行性：保存が滞ったルームが他のルームのチャットを止めないこと

use std::{collections::HashMap, sync::Arc};

use syncme_shared::{
    protocol::{ReceivedMessage, ServerEvent},
    time::Clock,
};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ChatMessageRepository, ConnectionId, MessageContent, RoomCode, RoomRepository,
    SenderName, Timestamp,
};

use super::{broadcast::RoomBroadcaster, error::SendMessageError};

/// 送信結果
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// 配信したメッセージ（サーバー付与のタイムスタンプ付き）
    pub message: ChatMessage,
    /// 履歴への保存に成功したか
    pub persisted: bool,
    /// 届いた接続数
    pub delivered: usize,
}

/// チャットメッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（所属ルームの確認に使用）
    repository: Arc<dyn RoomRepository>,
    /// チャット履歴の永続化
    chat_repository: Arc<dyn ChatMessageRepository>,
    /// ルームへのブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
    /// タイムスタンプの付与
    clock: Arc<dyn Clock>,
    /// ルームごとに保存と配信を直列化し、最後に付与したタイムスタンプを保持する
    relays: Mutex<HashMap<RoomCode, Arc<Mutex<i64>>>>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        chat_repository: Arc<dyn ChatMessageRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            chat_repository,
            broadcaster,
            clock,
            relays: Mutex::new(HashMap::new()),
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続（指定ルームの参加者である必要がある）
    /// * `raw_code` - 送信先のルームコード
    /// * `sender` - 表示名
    /// * `content` - 本文
    ///
    /// # Returns
    ///
    /// * `Ok(SentMessage)` - 配信結果（保存に失敗しても配信は行われる）
    /// * `Err(SendMessageError)` - 入力値の不正、または送信元がルームに所属していない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        raw_code: &str,
        sender: String,
        content: String,
    ) -> Result<SentMessage, SendMessageError> {
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| SendMessageError::NotInRoom(raw_code.to_string()))?;
        let sender = SenderName::new(sender).map_err(SendMessageError::InvalidSender)?;
        let content = MessageContent::new(content).map_err(SendMessageError::InvalidContent)?;

        if self.repository.current_room(connection_id).await.as_ref() != Some(&code) {
            return Err(SendMessageError::NotInRoom(code.into_string()));
        }

        // 保存が滞っても他のルームのチャットは止まらない
        let relay = self.relay_for(&code).await;
        let mut last_timestamp = relay.lock().await;
        let timestamp = self.clock.now_millis().max(*last_timestamp);
        *last_timestamp = timestamp;

        let message = ChatMessage::new(code.clone(), sender, content, Timestamp::new(timestamp));

        let persisted = match self.chat_repository.insert(message.clone()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to persist chat message for room '{}': {}",
                    code,
                    e
                );
                false
            }
        };

        let event = ServerEvent::ReceiveMessage(ReceivedMessage::from(message.clone()));
        let delivered = self.broadcaster.broadcast_to_room(&code, &event, None).await?;

        Ok(SentMessage {
            message,
            persisted,
            delivered,
        })
    }

    async fn relay_for(&self, code: &RoomCode) -> Arc<Mutex<i64>> {
        let mut relays = self.relays.lock().await;
        relays
            .entry(code.clone())
            .or_insert_with(|| Arc::new(Mutex::new(i64::MIN)))
            .clone()
    }
}
