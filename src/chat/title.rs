//! Conversation titles derived from user messages.

use super::message::Message;

pub const NEW_CONVERSATION: &str = "New Conversation";
pub const NO_USER_MESSAGES: &str = "(No user messages yet)";
pub const UNTITLED: &str = "(Untitled)";
pub const MAX_TITLE_CHARS: usize = 60;

/// Joins user texts with single spaces, cut to `MAX_TITLE_CHARS` characters
/// with a trailing ellipsis when anything was dropped.
pub fn summarize(messages: &[Message]) -> String {
    let joined = messages
        .iter()
        .filter(|m| m.is_user())
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        return NO_USER_MESSAGES.to_string();
    }

    match joined.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => format!("{}...", &joined[..cut]),
        None => joined,
    }
}

/// Title stored for a manual rename.
pub fn manual_title(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
