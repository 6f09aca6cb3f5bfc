//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, raw_code: &str) -> Result<Room, GetRoomDetailError> {
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.repository
            .get_room(&code)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
