//! Free-text query normalization shared by the gateway and the coordinator.

use regex::Regex;

/// Trims `text` and collapses every internal whitespace run to one space.
///
/// Returns `None` when nothing but whitespace remains, which callers treat
/// as "no query" and never send over the network.
#[must_use]
pub fn normalize_query(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let re = Regex::new(r"\s+").expect("valid whitespace regex");
    Some(re.replace_all(trimmed, " ").into_owned())
}

/// Number of user-visible characters in `text` (not bytes).
#[must_use]
pub fn query_len(text: &str) -> usize {
    text.trim().chars().count()
}
