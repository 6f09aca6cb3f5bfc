//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use syncme_shared::protocol::{ClientEvent, ErrorPayload, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::ConnectionId,
    ui::{
        router::{dispatch, reply},
        state::AppState,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards queued events to the WebSocket sink.
///
/// Every event addressed to this connection goes through its queue, so the
/// order in which the relay enqueued them is the order the client sees.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connect_client_usecase.execute(tx).await;
    tracing::info!("Client '{}' connected", connection_id);

    reply(
        &state,
        &connection_id,
        ServerEvent::Connected(connection_id.as_str().to_string()),
    )
    .await;

    let mut send_task = pusher_loop(rx, sender);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut recv_task = tokio::spawn(recv_loop(
        receiver,
        shutdown_rx,
        state.clone(),
        connection_id.clone(),
    ));

    // The receive side is never aborted mid-dispatch: once the send side is
    // gone it is asked to stop and finishes the event it is handling.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            shutdown_tx.send(()).ok();
            if let Err(e) = (&mut recv_task).await {
                tracing::warn!("Receive task for '{}' failed: {}", connection_id, e);
            }
        }
    };

    let changes = state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await;
    tracing::info!(
        "Client '{}' disconnected ({} room(s) affected)",
        connection_id,
        changes.len()
    );
}

/// Dispatches inbound frames until the client leaves or `shutdown` fires.
///
/// `shutdown` is only observed between frames.
async fn recv_loop<S>(
    mut receiver: S,
    mut shutdown: oneshot::Receiver<()>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut shutdown => {
                tracing::debug!("Send side of '{}' closed, stop receiving", connection_id);
                break;
            }
        };

        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => handle_text(&state, &connection_id, text.as_str()).await,
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", connection_id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}

async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    match ClientEvent::from_json(text) {
        Ok(event) => dispatch(state, connection_id, event).await,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            reply(
                state,
                connection_id,
                ServerEvent::Error(ErrorPayload::new(format!("Malformed event: {}", e))),
            )
            .await
        }
    }
}
