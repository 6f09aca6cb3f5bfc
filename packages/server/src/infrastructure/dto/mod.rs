//! Data Transfer Objects (DTOs).
//!
//! - `http`: HTTP API response DTOs
//! - `conversion`: domain entities → wire DTOs (WebSocket events live in
//!   `syncme_shared::protocol`)

pub mod conversion;
pub mod http;
