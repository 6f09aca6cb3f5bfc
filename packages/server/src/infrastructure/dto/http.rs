//! HTTP API response DTOs.

use serde::Serialize;

/// One row of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub code: String,
    pub host: Option<String>,
    pub participant_count: usize,
    /// RFC 3339
    pub created_at: String,
}

/// `GET /api/rooms/{code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub code: String,
    pub host: Option<String>,
    pub participants: Vec<String>,
    pub created_at: String,
}
