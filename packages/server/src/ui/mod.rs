//! UI layer: axum router, WebSocket handler, event dispatch and HTTP API.

mod handler;
mod router;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
