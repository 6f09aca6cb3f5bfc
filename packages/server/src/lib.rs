//! Room relay server library.
//!
//! This library provides the server side of syncme: an in-memory registry of
//! ephemeral rooms, host-authoritative playback synchronization and a chat
//! relay with bounded history, exposed over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
