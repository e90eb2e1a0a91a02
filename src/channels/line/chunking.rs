//! Text chunking for LINE's message size limits
//!
//! A text message holds at most 5000 characters and one reply or push call
//! carries at most 5 messages. Long text is split on line boundaries where
//! possible; anything past the fifth message is cut and marked with an
//! ellipsis.

use crate::channels::OutgoingMessage;

/// Maximum characters in one text message
pub const MAX_TEXT_CHARS: usize = 5000;

/// Maximum messages in one reply or push request
pub const MAX_MESSAGES_PER_REQUEST: usize = 5;

/// Appended to the last chunk when text had to be dropped
const TRUNCATION_MARKER: &str = "\n…";

/// Split `text` into chunks of at most `limit` characters
///
/// Prefers breaking after the last newline inside the window, then after the
/// last space, then at the hard limit. Never returns empty chunks.
#[must_use]
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        if remaining.chars().count() <= limit {
            chunks.push(remaining.to_string());
            break;
        }

        let split_at = find_split_point(remaining, limit);
        let chunk = remaining[..split_at].trim_end();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

/// Byte offset to split at so the head holds at most `limit` characters
fn find_split_point(text: &str, limit: usize) -> usize {
    let hard = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(idx, _)| idx);
    let window = &text[..hard];

    if let Some(pos) = window.rfind('\n').filter(|&p| p > 0) {
        return pos + 1;
    }
    if let Some(pos) = window.rfind(' ').filter(|&p| p > 0) {
        return pos + 1;
    }
    hard
}

/// Build the text messages for one request, truncating overflow
#[must_use]
pub fn text_messages(text: &str) -> Vec<OutgoingMessage> {
    let mut chunks = chunk_text(text, MAX_TEXT_CHARS);
    if chunks.is_empty() {
        return vec![OutgoingMessage::text(text)];
    }

    if chunks.len() > MAX_MESSAGES_PER_REQUEST {
        tracing::debug!(
            chunks = chunks.len(),
            "reply exceeds message cap, truncating"
        );
        chunks.truncate(MAX_MESSAGES_PER_REQUEST);
        if let Some(last) = chunks.last_mut() {
            let marker_len = TRUNCATION_MARKER.chars().count();
            if last.chars().count() + marker_len > MAX_TEXT_CHARS {
                let keep = MAX_TEXT_CHARS - marker_len;
                *last = last.chars().take(keep).collect();
            }
            last.push_str(TRUNCATION_MARKER);
        }
    }

    chunks.into_iter().map(OutgoingMessage::text).collect()
}
