//! Reconnection policy.
//!
//! Pure functions, kept apart from the session so they are easy to test.

use crate::error::ClientError;

/// Check if the client should exit immediately based on the error type.
///
/// Room errors and configuration errors will not go away by reconnecting.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::RoomNotFound(_) | ClientError::RoomExists(_) | ClientError::Config(_)
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_exit_immediately_with_room_errors() {
        // テスト項目: ルームが存在しない・既に存在する場合は即座に終了すべきと判定される
        // given (前提条件):
        let not_found = ClientError::RoomNotFound("ABC123".to_string());
        let exists = ClientError::RoomExists("ABC123".to_string());

        // when (操作):
        let results = (
            should_exit_immediately(&not_found),
            should_exit_immediately(&exists),
        );

        // then (期待する結果):
        assert_eq!(results, (true, true));
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: ConnectionError の場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 接続エラーで試行回数が上限未満なら再接続する
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let first = should_attempt_reconnect(&error, 0, 5);
        let last = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(first);
        assert!(last);
    }

    #[test]
    fn test_should_not_reconnect_at_limit() {
        // テスト項目: 試行回数が上限に達したら再接続しない
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_not_reconnect_on_room_not_found() {
        // テスト項目: ルームが存在しない場合は試行回数に関わらず再接続しない
        // given (前提条件):
        let error = ClientError::RoomNotFound("ZZZ999".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 0, 5);

        // then (期待する結果):
        assert!(!result);
    }
}
