//! WebSocket client session management.

use std::fmt::Display;

use futures_util::{Sink, SinkExt, StreamExt};
use syncme_shared::protocol::{ClientEvent, ServerEvent};
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    command::Command,
    config::ClientConfig,
    controller::{Output, RoomController},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Run one WebSocket session until the user quits or the connection drops
///
/// # Returns
///
/// * `Ok(())` - the user left (`/quit`, Ctrl+C, Ctrl+D)
/// * `Err(ClientError)` - connection lost, or a room error that ends the session
pub async fn run_client_session(
    config: &ClientConfig,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to syncme server!");
    println!(
        "\nYou are '{}'. Type messages and press Enter to send, /help for commands.\n",
        config.name
    );

    let (mut write, mut read) = ws_stream.split();
    let mut controller = RoomController::new(config.clone(), Instant::now());

    let mut heartbeat = tokio::time::interval(config.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let sync_deadline = controller.sync_deadline();

        let outputs = tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_json(text.as_str()) {
                    Ok(event) => controller.on_server_event(event, Instant::now()),
                    Err(e) => {
                        tracing::debug!("Unrecognized frame: {}", e);
                        vec![Output::Show(MessageFormatter::format_raw_message(text.as_str()))]
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
                Some(Ok(_)) => Vec::new(),
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
            },
            line = input_rx.recv() => match line {
                Some(line) => match Command::parse(&line) {
                    Ok(Some(command)) => controller.on_command(command, Instant::now()),
                    Ok(None) => Vec::new(),
                    Err(e) => vec![Output::Show(MessageFormatter::format_error(&e.to_string()))],
                },
                // Input thread ended (Ctrl+C / Ctrl+D)
                None => vec![Output::Quit],
            },
            _ = heartbeat.tick(), if controller.heartbeat_active() => {
                controller.on_heartbeat(Instant::now())
            }
            _ = tokio::time::sleep_until(sync_deadline.unwrap_or_else(Instant::now)),
                if sync_deadline.is_some() => {
                controller.on_sync_timeout(Instant::now())
            }
        };

        for output in outputs {
            match output {
                Output::Send(event) => send_event(&mut write, &event).await?,
                Output::Show(text) => {
                    print!("{}", text);
                    redisplay_prompt(&config.name);
                }
                Output::Quit => {
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                }
                Output::Fatal(e) => return Err(e),
            }
        }
    }
}

async fn send_event<S>(write: &mut S, event: &ClientEvent) -> Result<(), ClientError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let json = match event.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize '{}': {}", event.name(), e);
            return Ok(());
        }
    };

    tracing::debug!("-> {}", event.name());
    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send message: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}
