//! InMemory ChatMessage Repository 実装
//!
//! ルームごとに挿入順のログを保持します。ログはルームの寿命とは独立しており、
//! ルーム削除後も残ります（同じコードが再利用されると履歴も見えます）。
//! 保持件数を超えた分は古いものから破棄します。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, ChatMessageRepository, RepositoryError, RoomCode};

/// Default number of messages retained per room
pub const DEFAULT_CHAT_RETENTION: usize = 1000;

/// インメモリ ChatMessage Repository 実装
#[derive(Debug)]
pub struct InMemoryChatMessageRepository {
    logs: Mutex<HashMap<RoomCode, VecDeque<ChatMessage>>>,
    retention: usize,
}

impl InMemoryChatMessageRepository {
    /// 保持件数を指定して作成（0 は 1 として扱う）
    pub fn new(retention: usize) -> Self {
        Self {
            logs: Mutex::new(HashMap::new()),
            retention: retention.max(1),
        }
    }
}

impl Default for InMemoryChatMessageRepository {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_RETENTION)
    }
}

#[async_trait]
impl ChatMessageRepository for InMemoryChatMessageRepository {
    async fn insert(&self, message: ChatMessage) -> Result<(), RepositoryError> {
        let mut logs = self.logs.lock().await;
        let log = logs.entry(message.room_code.clone()).or_default();
        log.push_back(message);
        while log.len() > self.retention {
            log.pop_front();
        }
        Ok(())
    }

    async fn find_recent(
        &self,
        room_code: &RoomCode,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let logs = self.logs.lock().await;
        let Some(log) = logs.get(room_code) else {
            return Ok(Vec::new());
        };

        // Log is in insertion order, so the tail is the most recent `limit`.
        let skip = log.len().saturating_sub(limit);
        let mut messages: Vec<ChatMessage> = log.iter().skip(skip).cloned().collect();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }
}
