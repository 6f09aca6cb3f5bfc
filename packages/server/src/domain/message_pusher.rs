//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信（通知）のインターフェース。
//! 接続の登録・登録解除も担い、Connection Registry の送信側を構成します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// クライアントの送信キュー（WebSocket の書き込みタスクが受信側を持つ）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントを登録
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    /// クライアントを登録解除（登録されていなかった場合は `false`）
    async fn unregister_client(&self, client_id: &ConnectionId) -> bool;

    /// 特定のクライアントに送信
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信（一部の送信失敗は許容し、届いた件数を返す）
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        content: &str,
    ) -> Result<usize, MessagePushError>;
}
