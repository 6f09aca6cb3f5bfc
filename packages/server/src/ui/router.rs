//! Inbound event dispatch.
//!
//! One arm per protocol event. Use cases perform the fan-out to other
//! connections; this table only turns their results into caller-only
//! replies (`room_created`, `room_exists`, `invalid_room`, `error`,
//! `chat_history`). Playback failures stay silent apart from a log line.

use syncme_shared::protocol::{
    ChatHistoryEntry, ClientEvent, ErrorPayload, HostUpdatePayload, JoinRoomPayload,
    SendMessagePayload, ServerEvent,
};

use crate::{
    domain::{ConnectionId, PlaybackPosition},
    usecase::{
        ChatHistoryError, CreateRoomError, JoinRoomError, PlaybackCommand, SendMessageError,
        SyncError,
    },
};

use super::state::AppState;

/// Route one parsed client event
pub async fn dispatch(state: &AppState, connection_id: &ConnectionId, event: ClientEvent) {
    tracing::debug!("'{}' -> {}", connection_id, event.name());

    match event {
        ClientEvent::CreateRoom(code) => on_create_room(state, connection_id, &code).await,
        ClientEvent::JoinRoom(payload) => on_join_room(state, connection_id, payload).await,
        ClientEvent::Play(code) => {
            on_host_command(state, connection_id, &code, Ok(PlaybackCommand::Play)).await
        }
        ClientEvent::Pause(code) => {
            on_host_command(state, connection_id, &code, Ok(PlaybackCommand::Pause)).await
        }
        ClientEvent::Seek(payload) => {
            let command = PlaybackPosition::new(payload.time).map(PlaybackCommand::Seek);
            on_host_command(state, connection_id, &payload.room_code, command).await
        }
        ClientEvent::TimeUpdate(payload) => {
            let command =
                PlaybackPosition::new(payload.current_time).map(PlaybackCommand::TimeUpdate);
            on_host_command(state, connection_id, &payload.room_code, command).await
        }
        ClientEvent::RequestSync(code) => on_request_sync(state, connection_id, &code).await,
        ClientEvent::HostUpdate(payload) => on_host_update(state, connection_id, payload).await,
        ClientEvent::SendMessage(payload) => on_send_message(state, connection_id, payload).await,
        ClientEvent::RequestChatHistory(code) => {
            send_chat_history(state, connection_id, &code).await
        }
    }
}

/// Reply to the caller only
pub async fn reply(state: &AppState, connection_id: &ConnectionId, event: ServerEvent) {
    if let Err(e) = state.broadcaster.send_to(connection_id, &event).await {
        tracing::warn!(
            "Failed to send '{}' to '{}': {}",
            event.name(),
            connection_id,
            e
        );
    }
}

async fn on_create_room(state: &AppState, connection_id: &ConnectionId, code: &str) {
    match state
        .create_room_usecase
        .execute(connection_id.clone(), code)
        .await
    {
        Ok(code) => reply(state, connection_id, ServerEvent::RoomCreated(code.into_string())).await,
        Err(CreateRoomError::DuplicateRoomCode(code)) => {
            tracing::info!("Room '{}' already exists, rejecting create", code);
            reply(state, connection_id, ServerEvent::RoomExists(code)).await
        }
        Err(e @ CreateRoomError::InvalidRoomCode(_)) => {
            reply(
                state,
                connection_id,
                ServerEvent::Error(ErrorPayload::new(e.to_string())),
            )
            .await
        }
    }
}

async fn on_join_room(state: &AppState, connection_id: &ConnectionId, payload: JoinRoomPayload) {
    match state
        .join_room_usecase
        .execute(connection_id.clone(), &payload.room_code, payload.is_host)
        .await
    {
        // A late joiner gets the recent conversation.
        Ok(joined) => send_chat_history(state, connection_id, joined.code.as_str()).await,
        Err(JoinRoomError::RoomNotFound(code)) => {
            tracing::info!("'{}' tried to join unknown room '{}'", connection_id, code);
            reply(state, connection_id, ServerEvent::InvalidRoom).await
        }
    }
}

async fn on_host_command(
    state: &AppState,
    connection_id: &ConnectionId,
    code: &str,
    command: Result<PlaybackCommand, crate::domain::ValueObjectError>,
) {
    let result = match command {
        Ok(command) => {
            state
                .playback_sync_usecase
                .relay_host_command(connection_id, code, command)
                .await
        }
        Err(e) => Err(SyncError::InvalidPosition(e)),
    };
    if let Err(e) = result {
        log_sync_error(connection_id, &e);
    }
}

async fn on_request_sync(state: &AppState, connection_id: &ConnectionId, code: &str) {
    if let Err(e) = state
        .playback_sync_usecase
        .request_sync(connection_id, code)
        .await
    {
        log_sync_error(connection_id, &e);
    }
}

async fn on_host_update(
    state: &AppState,
    connection_id: &ConnectionId,
    payload: HostUpdatePayload,
) {
    if let Err(e) = state
        .playback_sync_usecase
        .host_update(
            connection_id,
            &payload.room_code,
            &payload.client_id,
            payload.is_playing,
            payload.current_time,
        )
        .await
    {
        log_sync_error(connection_id, &e);
    }
}

fn log_sync_error(connection_id: &ConnectionId, error: &SyncError) {
    match error {
        SyncError::NoHostAvailable(_) => {
            tracing::info!("Sync request from '{}' dropped: {}", connection_id, error)
        }
        _ => tracing::warn!("Dropped playback event from '{}': {}", connection_id, error),
    }
}

async fn on_send_message(
    state: &AppState,
    connection_id: &ConnectionId,
    payload: SendMessagePayload,
) {
    match state
        .send_message_usecase
        .execute(
            connection_id,
            &payload.room_code,
            payload.sender,
            payload.content,
        )
        .await
    {
        Ok(sent) => tracing::debug!(
            "Chat message in '{}' delivered to {} connection(s) (persisted: {})",
            sent.message.room_code,
            sent.delivered,
            sent.persisted
        ),
        Err(SendMessageError::NotInRoom(code)) => {
            tracing::warn!("'{}' is not a member of room '{}'", connection_id, code);
            reply(state, connection_id, ServerEvent::InvalidRoom).await
        }
        Err(e @ (SendMessageError::InvalidSender(_) | SendMessageError::InvalidContent(_))) => {
            reply(
                state,
                connection_id,
                ServerEvent::Error(ErrorPayload::new(e.to_string())),
            )
            .await
        }
        Err(e @ SendMessageError::Broadcast(_)) => {
            tracing::error!("Failed to relay chat message: {}", e)
        }
    }
}

async fn send_chat_history(state: &AppState, connection_id: &ConnectionId, code: &str) {
    match state.chat_history_usecase.execute(code).await {
        Ok(messages) => {
            let entries = messages.into_iter().map(ChatHistoryEntry::from).collect();
            reply(state, connection_id, ServerEvent::ChatHistory(entries)).await
        }
        Err(ChatHistoryError::InvalidRoomCode(e)) => {
            reply(
                state,
                connection_id,
                ServerEvent::Error(ErrorPayload::new(format!("Invalid room code: {}", e))),
            )
            .await
        }
        Err(e @ ChatHistoryError::Persistence(_)) => {
            tracing::warn!("Failed to load chat history for '{}': {}", code, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::MessagePusher,
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemoryChatMessageRepository, InMemoryRoomRepository},
        },
    };
    use std::sync::Arc;
    use syncme_shared::{
        protocol::{SeekPayload, TimeUpdatePayload},
        time::FixedClock,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - dispatch: 受信イベントからユースケースへの振り分けと、呼び出し元のみへの返信
    //
    // 【なぜこのテストが必要か】
    // - invalid_room / room_exists / error / chat_history は呼び出し元だけに届く必要がある
    // - 不正な再生位置を含むイベントが誰にも中継されないことを保証する
    // ========================================

    struct Harness {
        state: AppState,
        pusher: Arc<WebSocketMessagePusher>,
    }

    impl Harness {
        fn new() -> Self {
            let pusher = Arc::new(WebSocketMessagePusher::new());
            let state = AppState::new(
                Arc::new(InMemoryRoomRepository::new()),
                Arc::new(InMemoryChatMessageRepository::default()),
                pusher.clone(),
                Arc::new(FixedClock::new(1_700_000_000_000)),
            );
            Self { state, pusher }
        }

        async fn connect(&self, id: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
            let connection_id = ConnectionId::new(id.to_string()).unwrap();
            let (tx, rx) = mpsc::unbounded_channel();
            self.pusher.register_client(connection_id.clone(), tx).await;
            (connection_id, rx)
        }

        async fn send(&self, connection_id: &ConnectionId, event: ClientEvent) {
            dispatch(&self.state, connection_id, event).await;
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(text) = rx.try_recv() {
            events.push(ServerEvent::from_json(&text).unwrap());
        }
        events
    }

    fn join(code: &str, is_host: bool) -> ClientEvent {
        ClientEvent::JoinRoom(JoinRoomPayload {
            room_code: code.to_string(),
            is_host,
        })
    }

    #[tokio::test]
    async fn test_create_room_replies_room_created() {
        // テスト項目: create_room の成功時は作成者に room_created が届く
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;

        // when (操作):
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx_a),
            vec![ServerEvent::RoomCreated("ABC123".to_string())]
        );
    }

    #[tokio::test]
    async fn test_duplicate_create_replies_room_exists_to_caller_only() {
        // テスト項目: 重複したコードでの create_room は呼び出し元にのみ room_exists が届く
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;
        let (b, mut rx_b) = harness.connect("B").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        drain(&mut rx_a);

        // when (操作):
        harness
            .send(&b, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerEvent::RoomExists("ABC123".to_string())]
        );
        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_join_unknown_room_replies_invalid_room_once() {
        // テスト項目: 存在しないルームへの join_room は invalid_room がちょうど 1 回だけ届く
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;
        let (b, mut rx_b) = harness.connect("B").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        drain(&mut rx_a);

        // when (操作):
        harness.send(&b, join("ZZZ999", false)).await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx_b), vec![ServerEvent::InvalidRoom]);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_join_sends_room_update_then_history() {
        // テスト項目: 参加者には room_update の後にチャット履歴が届く
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;
        let (b, mut rx_b) = harness.connect("B").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        harness
            .send(
                &a,
                ClientEvent::SendMessage(SendMessagePayload {
                    room_code: "ABC123".to_string(),
                    sender: "A".to_string(),
                    content: "welcome".to_string(),
                }),
            )
            .await;
        drain(&mut rx_a);

        // when (操作):
        harness.send(&b, join("ABC123", false)).await;

        // then (期待する結果):
        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ServerEvent::RoomUpdate(2));
        match &events[1] {
            ServerEvent::ChatHistory(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].content, "welcome");
                assert_eq!(entries[0].room_code, "ABC123");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(drain(&mut rx_a), vec![ServerEvent::RoomUpdate(2)]);
    }

    #[tokio::test]
    async fn test_negative_seek_is_not_relayed() {
        // テスト項目: 負の位置への seek は中継されない
        // given (前提条件):
        let harness = Harness::new();
        let (a, _rx_a) = harness.connect("A").await;
        let (b, mut rx_b) = harness.connect("B").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        harness.send(&b, join("ABC123", false)).await;
        drain(&mut rx_b);

        // when (操作):
        harness
            .send(
                &a,
                ClientEvent::Seek(SeekPayload {
                    room_code: "ABC123".to_string(),
                    time: -5.0,
                }),
            )
            .await;
        harness
            .send(
                &a,
                ClientEvent::TimeUpdate(TimeUpdatePayload {
                    room_code: "ABC123".to_string(),
                    current_time: 7.0,
                }),
            )
            .await;

        // then (期待する結果): 正常な time_update のみが届く
        assert_eq!(drain(&mut rx_b), vec![ServerEvent::HostTimeUpdate(7.0)]);
    }

    #[tokio::test]
    async fn test_invalid_chat_replies_error_to_caller_only() {
        // テスト項目: 空白のみのチャットは送信者にのみ error が届き、他の参加者には何も届かない
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;
        let (b, mut rx_b) = harness.connect("B").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        harness.send(&b, join("ABC123", false)).await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        // when (操作):
        harness
            .send(
                &b,
                ClientEvent::SendMessage(SendMessagePayload {
                    room_code: "ABC123".to_string(),
                    sender: "B".to_string(),
                    content: "   ".to_string(),
                }),
            )
            .await;

        // then (期待する結果):
        let events = drain(&mut rx_b);
        assert!(matches!(events.as_slice(), [ServerEvent::Error(_)]));
        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_chat_from_non_member_replies_invalid_room() {
        // テスト項目: 参加していないルームへのチャットは invalid_room になる
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;
        let (z, mut rx_z) = harness.connect("Z").await;
        harness
            .send(&a, ClientEvent::CreateRoom("ABC123".to_string()))
            .await;
        drain(&mut rx_a);

        // when (操作):
        harness
            .send(
                &z,
                ClientEvent::SendMessage(SendMessagePayload {
                    room_code: "ABC123".to_string(),
                    sender: "Z".to_string(),
                    content: "hi".to_string(),
                }),
            )
            .await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx_z), vec![ServerEvent::InvalidRoom]);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_request_chat_history_for_empty_room() {
        // テスト項目: メッセージのないルームの履歴要求には空の chat_history が届く
        // given (前提条件):
        let harness = Harness::new();
        let (a, mut rx_a) = harness.connect("A").await;

        // when (操作):
        harness
            .send(&a, ClientEvent::RequestChatHistory("EMPTY".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx_a), vec![ServerEvent::ChatHistory(Vec::new())]);
    }
}
