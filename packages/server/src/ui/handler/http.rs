//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use syncme_shared::protocol::ChatHistoryEntry;

use crate::{
    infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::ChatHistoryError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room = state
        .get_room_detail_usecase
        .execute(&code)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    Ok(Json(RoomDetailDto::from(room)))
}

/// Get the most recent chat messages of a room
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<ChatHistoryEntry>>, StatusCode> {
    match state.chat_history_usecase.execute(&code).await {
        Ok(messages) => Ok(Json(
            messages.into_iter().map(ChatHistoryEntry::from).collect(),
        )),
        Err(ChatHistoryError::InvalidRoomCode(_)) => Err(StatusCode::BAD_REQUEST),
        Err(e @ ChatHistoryError::Persistence(_)) => {
            tracing::warn!("Failed to load chat history for '{}': {}", code, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
