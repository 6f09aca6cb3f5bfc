//! UseCase: チャット履歴取得

use std::sync::Arc;

use syncme_shared::protocol::CHAT_HISTORY_LIMIT;

use crate::domain::{ChatMessage, ChatMessageRepository, RoomCode};

use super::error::ChatHistoryError;

/// チャット履歴取得のユースケース
pub struct ChatHistoryUseCase {
    chat_repository: Arc<dyn ChatMessageRepository>,
}

impl ChatHistoryUseCase {
    /// 新しい ChatHistoryUseCase を作成
    pub fn new(chat_repository: Arc<dyn ChatMessageRepository>) -> Self {
        Self { chat_repository }
    }

    /// ルームの直近のメッセージをタイムスタンプ昇順で取得
    ///
    /// ルームの存在は確認しない。削除済みのルームでも保持中の履歴は返る。
    pub async fn execute(&self, raw_code: &str) -> Result<Vec<ChatMessage>, ChatHistoryError> {
        let code =
            RoomCode::new(raw_code.to_string()).map_err(ChatHistoryError::InvalidRoomCode)?;
        let messages = self
            .chat_repository
            .find_recent(&code, CHAT_HISTORY_LIMIT)
            .await?;
        Ok(messages)
    }
}
