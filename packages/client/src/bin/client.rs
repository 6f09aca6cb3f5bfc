//! syncme terminal client.
//!
//! Hosts a room (`--host-mode`) or follows one (`--room CODE`). Plain lines
//! are chat; `/help` lists the playback commands. Reconnects automatically
//! on connection loss (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin syncme-client -- --host-mode --name Alice --room ABC123
//! cargo run --bin syncme-client -- --name Bob --room ABC123
//! ```

use clap::Parser;

use syncme_client::config::{
    ClientConfig, DEFAULT_HEARTBEAT_SECS, DEFAULT_SYNC_TIMEOUT_SECS, Role,
};
use syncme_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "syncme-client")]
#[command(about = "Watch-party client: host or follow a synchronized room and chat", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8000/ws")]
    url: String,

    /// Room code to join (or to create with --host-mode; generated if omitted)
    #[arg(short = 'r', long)]
    room: Option<String>,

    /// Display name used for chat messages
    #[arg(short = 'n', long)]
    name: String,

    /// Create the room and drive playback
    #[arg(long)]
    host_mode: bool,

    /// Seconds between position heartbeats while hosting
    #[arg(long, default_value_t = DEFAULT_HEARTBEAT_SECS)]
    heartbeat_secs: u64,

    /// Seconds a follower waits for the host to answer a sync request
    #[arg(long, default_value_t = DEFAULT_SYNC_TIMEOUT_SECS)]
    sync_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let role = if args.host_mode {
        Role::Host
    } else {
        Role::Follower
    };

    let config = match ClientConfig::new(
        args.url,
        args.room,
        args.name,
        role,
        args.heartbeat_secs,
        args.sync_timeout_secs,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = syncme_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
