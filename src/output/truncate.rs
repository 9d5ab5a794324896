//! Output truncation for size-capped chat messages.

/// Appended once to text that was cut short.
pub const DEFAULT_TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Cut `text` to at most `max_chars` characters, appending `marker` if
/// anything was removed.
///
/// Lengths are counted in `char`s so multi-byte text is never split.
pub fn truncate(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + marker.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(marker);
            out
        }
    }
}

/// Whether [`truncate`] would cut `text`.
pub fn exceeds(text: &str, max_chars: usize) -> bool {
    text.chars().nth(max_chars).is_some()
}
