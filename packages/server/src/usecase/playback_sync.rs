//! UseCase: 再生同期（Playback Sync Relay）
//!
//! ホストの再生操作をフォロワーへ中継し、フォロワーからの同期要求をホストへ、
//! ホストからの状態通知を要求元のフォロワーへ届けます。
//! リレー自身は再生状態を保持しません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - relay_host_command: 送信者以外への host_* イベントの配信
//! - request_sync: ホストへの request_sync の転送
//! - host_update: 要求元フォロワーのみへの force_sync 配信
//!
//! ### なぜこのテストが必要か
//! - 再生の制御権はホストのみが持つ（フォロワーからの play は無視される）
//! - 他のルームや他のフォロワーにイベントが漏れないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホストの play/seek の中継、同期要求と応答
//! - 異常系：フォロワーからの再生操作、ホスト不在時の同期要求、負の再生位置
//! - エッジケース：ルームコードの不一致、他ルームのフォロワー宛ての host_update

use std::sync::Arc;

use syncme_shared::protocol::{ForceSyncPayload, ServerEvent};

use crate::domain::{ConnectionId, PlaybackPosition, RoomCode, RoomRepository};

use super::{broadcast::RoomBroadcaster, error::SyncError};

/// ホストの再生操作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Seek(PlaybackPosition),
    /// 定期的な再生位置の通知
    TimeUpdate(PlaybackPosition),
}

impl PlaybackCommand {
    fn to_event(self) -> ServerEvent {
        match self {
            Self::Play => ServerEvent::HostPlay,
            Self::Pause => ServerEvent::HostPause,
            Self::Seek(position) => ServerEvent::HostSeek(position.seconds()),
            Self::TimeUpdate(position) => ServerEvent::HostTimeUpdate(position.seconds()),
        }
    }
}

/// 再生同期のユースケース
pub struct PlaybackSyncUseCase {
    /// Repository（所属ルームとホストの解決に使用）
    repository: Arc<dyn RoomRepository>,
    /// ルームへのブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
}

impl PlaybackSyncUseCase {
    /// 新しい PlaybackSyncUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, broadcaster: Arc<RoomBroadcaster>) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    /// ホストの再生操作をルームの他の参加者へ中継
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - イベントが届いた接続数
    /// * `Err(SyncError)` - 所属していない、またはホストではない
    pub async fn relay_host_command(
        &self,
        connection_id: &ConnectionId,
        raw_code: &str,
        command: PlaybackCommand,
    ) -> Result<usize, SyncError> {
        let code = self.resolve_room(connection_id, raw_code).await?;
        self.ensure_host(connection_id, &code).await?;

        let event = command.to_event();
        let delivered = self
            .broadcaster
            .broadcast_to_room(&code, &event, Some(connection_id))
            .await?;
        Ok(delivered)
    }

    /// フォロワーの同期要求をホストへ転送
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 要求を転送したホスト
    /// * `Err(SyncError::NoHostAvailable)` - ホストが不在、または到達できない
    pub async fn request_sync(
        &self,
        connection_id: &ConnectionId,
        raw_code: &str,
    ) -> Result<ConnectionId, SyncError> {
        let code = self.resolve_room(connection_id, raw_code).await?;
        let host = self
            .repository
            .get_host(&code)
            .await
            .ok_or_else(|| SyncError::NoHostAvailable(code.as_str().to_string()))?;

        let event = ServerEvent::RequestSync(connection_id.as_str().to_string());
        self.broadcaster.send_to(&host, &event).await.map_err(|e| {
            tracing::debug!("Sync request to host '{}' failed: {}", host, e);
            SyncError::NoHostAvailable(code.as_str().to_string())
        })?;
        Ok(host)
    }

    /// ホストの再生状態を要求元のフォロワーへ送信
    pub async fn host_update(
        &self,
        connection_id: &ConnectionId,
        raw_code: &str,
        follower: &str,
        is_playing: bool,
        current_time: f64,
    ) -> Result<(), SyncError> {
        let code = self.resolve_room(connection_id, raw_code).await?;
        self.ensure_host(connection_id, &code).await?;

        let position = PlaybackPosition::new(current_time).map_err(SyncError::InvalidPosition)?;
        let follower = ConnectionId::new(follower.to_string())
            .map_err(SyncError::InvalidConnectionId)?;
        if self.repository.current_room(&follower).await.as_ref() != Some(&code) {
            return Err(SyncError::FollowerNotInRoom(follower.into_string()));
        }

        let event = ServerEvent::ForceSync(ForceSyncPayload {
            is_playing,
            current_time: position.seconds(),
        });
        self.broadcaster.send_to(&follower, &event).await?;
        Ok(())
    }

    /// 接続が所属するルームを解決する
    ///
    /// ペイロードのルームコードは所属ルームとの照合にのみ使う。
    async fn resolve_room(
        &self,
        connection_id: &ConnectionId,
        raw_code: &str,
    ) -> Result<RoomCode, SyncError> {
        let current = self
            .repository
            .current_room(connection_id)
            .await
            .ok_or_else(|| SyncError::NotInRoom(raw_code.to_string()))?;

        if current.as_str() != raw_code.trim() {
            tracing::warn!(
                "'{}' sent a command for room '{}' but is in room '{}'",
                connection_id,
                raw_code,
                current
            );
            return Err(SyncError::NotInRoom(raw_code.to_string()));
        }
        Ok(current)
    }

    async fn ensure_host(
        &self,
        connection_id: &ConnectionId,
        code: &RoomCode,
    ) -> Result<(), SyncError> {
        match self.repository.get_host(code).await {
            Some(host) if &host == connection_id => Ok(()),
            _ => Err(SyncError::NotHost(code.as_str().to_string())),
        }
    }
}
