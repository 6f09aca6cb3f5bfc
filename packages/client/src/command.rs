//! Parsing of terminal input lines.

use thiserror::Error;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    /// Seek to an absolute position in seconds
    Seek(f64),
    /// Ask the host for its playback state again
    Sync,
    /// Show local playback state
    Status,
    History,
    Help,
    Quit,
    /// Anything that is not a slash command
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (try /help)")]
    Unknown(String),

    #[error("Usage: /seek <seconds> (a non-negative number)")]
    InvalidSeek,
}

pub const HELP: &str = "\
/play            start playback (host)
/pause           pause playback (host)
/seek <seconds>  jump to a position (host)
/sync            resync with the host (follower)
/status          show local playback position
/history         show recent chat messages
/quit            leave
anything else is sent as a chat message";

impl Command {
    /// Parse one input line. Returns `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Self::Chat(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match name {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "seek" => {
                let seconds = parts
                    .next()
                    .and_then(|value| value.parse::<f64>().ok())
                    .filter(|value| value.is_finite() && *value >= 0.0)
                    .ok_or(CommandError::InvalidSeek)?;
                Self::Seek(seconds)
            }
            "sync" => Self::Sync,
            "status" => Self::Status,
            "history" => Self::History,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_commands() {
        // テスト項目: スラッシュコマンドが対応するコマンドに変換される
        // given (前提条件):
        let inputs = ["/play", "/pause", "/seek 42.5", "/sync", "/history", "/quit"];

        // when (操作):
        let parsed: Vec<Option<Command>> = inputs
            .iter()
            .map(|line| Command::parse(line).unwrap())
            .collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                Some(Command::Play),
                Some(Command::Pause),
                Some(Command::Seek(42.5)),
                Some(Command::Sync),
                Some(Command::History),
                Some(Command::Quit),
            ]
        );
    }

    #[test]
    fn test_plain_line_is_chat() {
        // テスト項目: スラッシュで始まらない行はチャットとして扱われ、前後の空白は除かれる
        // given (前提条件):
        let line = "  hello everyone ";

        // when (操作):
        let parsed = Command::parse(line);

        // then (期待する結果):
        assert_eq!(parsed, Ok(Some(Command::Chat("hello everyone".to_string()))));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        // テスト項目: 空行はコマンドにならない
        // given (前提条件):

        // when (操作):
        let parsed = Command::parse("   ");

        // then (期待する結果):
        assert_eq!(parsed, Ok(None));
    }

    #[test]
    fn test_invalid_seek() {
        // テスト項目: /seek は非負の数値が必要
        // given (前提条件):

        // when (操作):
        let missing = Command::parse("/seek");
        let negative = Command::parse("/seek -3");
        let garbage = Command::parse("/seek soon");

        // then (期待する結果):
        assert_eq!(missing, Err(CommandError::InvalidSeek));
        assert_eq!(negative, Err(CommandError::InvalidSeek));
        assert_eq!(garbage, Err(CommandError::InvalidSeek));
    }

    #[test]
    fn test_unknown_command() {
        // テスト項目: 未知のコマンドはエラーになる
        // given (前提条件):

        // when (操作):
        let parsed = Command::parse("/rewind");

        // then (期待する結果):
        assert_eq!(parsed, Err(CommandError::Unknown("rewind".to_string())));
    }
}
