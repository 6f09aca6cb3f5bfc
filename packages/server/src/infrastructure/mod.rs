//! Infrastructure layer: concrete Room Store, chat store, message pusher and DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
