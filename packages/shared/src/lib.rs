//! Code shared by the syncme server and client.
//!
//! - `protocol`: WebSocket event envelopes exchanged between clients and the relay
//! - `time`: clock abstraction and timestamp formatting
//! - `logger`: tracing subscriber setup

pub mod logger;
pub mod protocol;
pub mod time;
