//! syncme room relay server.
//!
//! Hosts ephemeral rooms where one host drives playback for its followers
//! and everyone in the room can chat.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin syncme-server
//! cargo run --bin syncme-server -- --host 0.0.0.0 --port 3000 --chat-retention 500
//! ```

use std::sync::Arc;

use clap::Parser;
use syncme_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryChatMessageRepository, InMemoryRoomRepository},
    },
    ui::{AppState, Server},
};
use syncme_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "syncme-server")]
#[command(about = "Watch-party room relay: playback sync and chat over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8000")]
    port: u16,

    /// Number of chat messages retained per room
    #[arg(long, default_value = "1000")]
    chat_retention: usize,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Repositories (in-memory)
    let repository = Arc::new(InMemoryRoomRepository::new());
    let chat_repository = Arc::new(InMemoryChatMessageRepository::new(args.chat_retention));
    tracing::info!(
        "Chat history retention: {} message(s) per room",
        args.chat_retention
    );

    // 2. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. UseCases wired into the shared state
    let state = Arc::new(AppState::new(
        repository,
        chat_repository,
        message_pusher,
        Arc::new(SystemClock),
    ));

    // 4. Run the server
    if let Err(e) = Server::new(state).run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
