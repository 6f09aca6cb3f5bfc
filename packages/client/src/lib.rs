//! Terminal client for syncme rooms.
//!
//! A client either hosts a room (and drives playback) or follows one. Both
//! can chat with everyone in the room.

pub mod command;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod playback;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
