//! Message formatting utilities for client display.

use syncme_shared::{
    protocol::ChatHistoryEntry,
    time::{rfc3339_to_timestamp, timestamp_to_rfc3339},
};

use crate::playback::DriftCorrection;

const RULE: &str = "------------------------------------------------------------";
const DOUBLE_RULE: &str = "============================================================";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown once the client is in a room
    ///
    /// # Arguments
    ///
    /// * `room_code` - The room the client is in
    /// * `is_host` - Whether this client drives playback
    pub fn format_room_entered(room_code: &str, is_host: bool) -> String {
        let role = if is_host {
            "host: /play, /pause and /seek control everyone's playback"
        } else {
            "follower: playback follows the host"
        };
        format!(
            "\n{}\nRoom {}\nYou are the {}\n{}\n",
            DOUBLE_RULE, room_code, role, DOUBLE_RULE
        )
    }

    /// Format a participant count update
    pub fn format_room_update(participant_count: usize) -> String {
        let noun = if participant_count == 1 {
            "participant"
        } else {
            "participants"
        };
        format!("\n* {} {} in the room\n", participant_count, noun)
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `from` - The display name of the sender
    /// * `content` - The message content
    /// * `timestamp` - Server-assigned RFC 3339 timestamp
    pub fn format_chat_message(from: &str, content: &str, timestamp: &str) -> String {
        format!(
            "\n\n{}\n@{}: {}\nsent at {}\n{}\n",
            RULE,
            from,
            content,
            normalize_timestamp(timestamp),
            RULE
        )
    }

    /// Format the chat history block
    pub fn format_chat_history(entries: &[ChatHistoryEntry]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\nRecent messages:\n", DOUBLE_RULE));

        if entries.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for entry in entries {
                output.push_str(&format!(
                    "[{}] @{}: {}\n",
                    normalize_timestamp(&entry.timestamp),
                    entry.sender,
                    entry.content
                ));
            }
        }

        output.push_str(DOUBLE_RULE);
        output.push('\n');
        output
    }

    /// Format a playback state line
    pub fn format_playback(label: &str, is_playing: bool, position: f64) -> String {
        let state = if is_playing { "playing" } else { "paused" };
        format!("\n> {}: {} at {}\n", label, state, format_position(position))
    }

    /// Format the result of a drift check (only non-trivial corrections are shown)
    pub fn format_drift(correction: &DriftCorrection) -> Option<String> {
        match correction {
            DriftCorrection::InSync { .. } => None,
            DriftCorrection::Slew { drift, rate } => Some(format!(
                "\n~ drift {:+.2}s, adjusting speed to {:.2}x\n",
                drift, rate
            )),
            DriftCorrection::HardSeek { drift, to } => Some(format!(
                "\n~ drift {:+.2}s, jumping to {}\n",
                drift,
                format_position(*to)
            )),
        }
    }

    /// Format an informational notice
    pub fn format_notice(text: &str) -> String {
        format!("\n* {}\n", text)
    }

    /// Format an error reported by the server or the client itself
    pub fn format_error(text: &str) -> String {
        format!("\n! {}\n", text)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

/// `mm:ss.s`
pub fn format_position(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor();
    format!("{:02}:{:04.1}", minutes as u64, seconds - minutes * 60.0)
}

/// Re-render server timestamps uniformly; unparsable values are shown as-is.
fn normalize_timestamp(timestamp: &str) -> String {
    rfc3339_to_timestamp(timestamp)
        .map(timestamp_to_rfc3339)
        .unwrap_or_else(|| timestamp.to_string())
}
