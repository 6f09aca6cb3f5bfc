//! Repository 実装
//!
//! - `inmemory`: プロセス内メモリを使った実装
//! - 将来的に: チャット履歴のための外部 DB 実装

pub mod inmemory;

pub use inmemory::{InMemoryChatMessageRepository, InMemoryRoomRepository};
