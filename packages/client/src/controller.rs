//! Room state machine of one client session.
//!
//! Consumes server events, user commands and timer ticks, and returns the
//! frames to send and the lines to print. No I/O happens here.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ホスト: ルーム作成、再生操作の送信、同期要求への応答
//! - フォロワー: 参加後の同期要求、host_* と force_sync の適用、同期タイムアウトの再試行
//!
//! ### なぜこのテストが必要か
//! - 再生の制御権はホストのみにあり、フォロワーは操作を送信してはならない
//! - 同期要求に応答がない場合でも無限に再試行しないことを保証する

use syncme_shared::protocol::{
    ClientEvent, HostUpdatePayload, JoinRoomPayload, SeekPayload, SendMessagePayload,
    ServerEvent, TimeUpdatePayload,
};
use tokio::time::Instant;

use crate::{
    command::{Command, HELP},
    config::{ClientConfig, Role},
    error::ClientError,
    formatter::MessageFormatter,
    playback::PlaybackClock,
};

/// Something the session has to do
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Send(ClientEvent),
    Show(String),
    Quit,
    Fatal(ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for `connected`
    Connecting,
    /// `create_room` / `join_room` sent
    Entering,
    InRoom,
}

#[derive(Debug)]
struct PendingSync {
    deadline: Instant,
    retries_left: u32,
}

pub struct RoomController {
    config: ClientConfig,
    phase: Phase,
    connection_id: Option<String>,
    room: Option<String>,
    clock: PlaybackClock,
    pending_sync: Option<PendingSync>,
}

impl RoomController {
    pub fn new(config: ClientConfig, now: Instant) -> Self {
        Self {
            config,
            phase: Phase::Connecting,
            connection_id: None,
            room: None,
            clock: PlaybackClock::new(now),
            pending_sync: None,
        }
    }

    pub fn is_host(&self) -> bool {
        self.config.role == Role::Host
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Host heartbeats run only while in a room and playing
    pub fn heartbeat_active(&self) -> bool {
        self.is_host() && self.phase == Phase::InRoom && self.clock.is_playing()
    }

    /// When the outstanding sync request times out
    pub fn sync_deadline(&self) -> Option<Instant> {
        self.pending_sync.as_ref().map(|pending| pending.deadline)
    }

    pub fn on_server_event(&mut self, event: ServerEvent, now: Instant) -> Vec<Output> {
        match event {
            ServerEvent::Connected(id) => self.on_connected(id),
            ServerEvent::RoomCreated(code) => {
                self.room = Some(code.clone());
                self.phase = Phase::InRoom;
                vec![Output::Show(MessageFormatter::format_room_entered(
                    &code, true,
                ))]
            }
            ServerEvent::RoomExists(code) => vec![Output::Fatal(ClientError::RoomExists(code))],
            ServerEvent::InvalidRoom => self.on_invalid_room(),
            ServerEvent::RoomUpdate(count) => self.on_room_update(count, now),
            ServerEvent::HostPlay => self.apply_follower(now, "host started playback", |clock| {
                clock.play(now)
            }),
            ServerEvent::HostPause => self.apply_follower(now, "host paused", |clock| {
                clock.pause(now)
            }),
            ServerEvent::HostSeek(time) => self.apply_follower(now, "host seeked", |clock| {
                clock.seek(time, now)
            }),
            ServerEvent::HostTimeUpdate(time) => {
                if self.is_host() {
                    return Vec::new();
                }
                let correction = self.clock.correct(time, now);
                MessageFormatter::format_drift(&correction)
                    .map(Output::Show)
                    .into_iter()
                    .collect()
            }
            ServerEvent::RequestSync(follower) => self.on_request_sync(follower, now),
            ServerEvent::ForceSync(payload) => {
                if self.is_host() {
                    return Vec::new();
                }
                self.pending_sync = None;
                self.clock
                    .force(payload.is_playing, payload.current_time, now);
                vec![Output::Show(MessageFormatter::format_playback(
                    "synced",
                    payload.is_playing,
                    payload.current_time,
                ))]
            }
            ServerEvent::ReceiveMessage(message) => {
                vec![Output::Show(MessageFormatter::format_chat_message(
                    &message.sender,
                    &message.content,
                    &message.timestamp,
                ))]
            }
            ServerEvent::ChatHistory(entries) => vec![Output::Show(
                MessageFormatter::format_chat_history(&entries),
            )],
            ServerEvent::Error(payload) => {
                vec![Output::Show(MessageFormatter::format_error(&payload.reason))]
            }
        }
    }

    pub fn on_command(&mut self, command: Command, now: Instant) -> Vec<Output> {
        if command == Command::Quit {
            return vec![Output::Quit];
        }
        if command == Command::Help {
            return vec![Output::Show(format!("\n{}\n", HELP))];
        }
        let Some(room) = self.room.clone().filter(|_| self.phase == Phase::InRoom) else {
            return vec![Output::Show(MessageFormatter::format_notice(
                "not in a room yet",
            ))];
        };

        match command {
            Command::Chat(content) => vec![Output::Send(ClientEvent::SendMessage(
                SendMessagePayload {
                    room_code: room,
                    sender: self.config.name.clone(),
                    content,
                },
            ))],
            Command::History => vec![Output::Send(ClientEvent::RequestChatHistory(room))],
            Command::Status => vec![Output::Show(MessageFormatter::format_playback(
                "local",
                self.clock.is_playing(),
                self.clock.position(now),
            ))],
            Command::Sync if self.is_host() => vec![Output::Show(MessageFormatter::format_notice(
                "the host is the reference; nothing to sync",
            ))],
            Command::Sync => self.request_sync(room, now),
            Command::Play | Command::Pause | Command::Seek(_) if !self.is_host() => {
                vec![Output::Show(MessageFormatter::format_notice(
                    "only the host controls playback",
                ))]
            }
            Command::Play => {
                self.clock.play(now);
                vec![Output::Send(ClientEvent::Play(room))]
            }
            Command::Pause => {
                self.clock.pause(now);
                vec![Output::Send(ClientEvent::Pause(room))]
            }
            Command::Seek(time) => {
                self.clock.seek(time, now);
                vec![Output::Send(ClientEvent::Seek(SeekPayload {
                    room_code: room,
                    time,
                }))]
            }
            Command::Quit | Command::Help => Vec::new(),
        }
    }

    /// Periodic host position report
    pub fn on_heartbeat(&mut self, now: Instant) -> Vec<Output> {
        match (&self.room, self.heartbeat_active()) {
            (Some(room), true) => vec![Output::Send(ClientEvent::TimeUpdate(TimeUpdatePayload {
                room_code: room.clone(),
                current_time: self.clock.position(now),
            }))],
            _ => Vec::new(),
        }
    }

    /// Called once the sync deadline has passed
    pub fn on_sync_timeout(&mut self, now: Instant) -> Vec<Output> {
        let Some(pending) = self.pending_sync.take() else {
            return Vec::new();
        };
        if pending.deadline > now {
            self.pending_sync = Some(pending);
            return Vec::new();
        }
        let Some(room) = self.room.clone() else {
            return Vec::new();
        };

        if pending.retries_left == 0 {
            tracing::warn!("Host did not answer sync requests for room '{}'", room);
            return vec![Output::Show(MessageFormatter::format_notice(
                "host did not answer; playback is unsynced (try /sync)",
            ))];
        }

        tracing::debug!(
            "Sync request timed out, retrying ({} left)",
            pending.retries_left - 1
        );
        self.pending_sync = Some(PendingSync {
            deadline: now + self.config.sync_timeout,
            retries_left: pending.retries_left - 1,
        });
        vec![Output::Send(ClientEvent::RequestSync(room))]
    }

    fn on_connected(&mut self, id: String) -> Vec<Output> {
        tracing::info!("Connected as '{}'", id);
        self.connection_id = Some(id);
        self.phase = Phase::Entering;

        let room = self.config.room.clone().unwrap_or_default();
        let event = match self.config.role {
            Role::Host => ClientEvent::CreateRoom(room),
            Role::Follower => {
                self.room = Some(room.clone());
                ClientEvent::JoinRoom(JoinRoomPayload {
                    room_code: room,
                    is_host: false,
                })
            }
        };
        vec![Output::Send(event)]
    }

    fn on_invalid_room(&mut self) -> Vec<Output> {
        if self.phase == Phase::Entering {
            let room = self.config.room.clone().unwrap_or_default();
            return vec![Output::Fatal(ClientError::RoomNotFound(room))];
        }
        vec![Output::Show(MessageFormatter::format_error(
            "the server no longer considers you a member of this room",
        ))]
    }

    fn on_room_update(&mut self, count: usize, now: Instant) -> Vec<Output> {
        let mut outputs = Vec::new();
        if self.phase == Phase::Entering && !self.is_host() {
            self.phase = Phase::InRoom;
            if let Some(room) = self.room.clone() {
                outputs.push(Output::Show(MessageFormatter::format_room_entered(
                    &room, false,
                )));
                outputs.extend(self.request_sync(room, now));
            }
        }
        outputs.push(Output::Show(MessageFormatter::format_room_update(count)));
        outputs
    }

    fn on_request_sync(&mut self, follower: String, now: Instant) -> Vec<Output> {
        match (&self.room, self.is_host()) {
            (Some(room), true) => vec![Output::Send(ClientEvent::HostUpdate(HostUpdatePayload {
                room_code: room.clone(),
                client_id: follower,
                is_playing: self.clock.is_playing(),
                current_time: self.clock.position(now),
            }))],
            _ => Vec::new(),
        }
    }

    fn request_sync(&mut self, room: String, now: Instant) -> Vec<Output> {
        self.pending_sync = Some(PendingSync {
            deadline: now + self.config.sync_timeout,
            retries_left: self.config.max_sync_retries,
        });
        vec![Output::Send(ClientEvent::RequestSync(room))]
    }

    fn apply_follower(
        &mut self,
        now: Instant,
        label: &str,
        apply: impl FnOnce(&mut PlaybackClock),
    ) -> Vec<Output> {
        if self.is_host() {
            return Vec::new();
        }
        apply(&mut self.clock);
        vec![Output::Show(MessageFormatter::format_playback(
            label,
            self.clock.is_playing(),
            self.clock.position(now),
        ))]
    }
}
