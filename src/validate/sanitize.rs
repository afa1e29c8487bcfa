//! Free-text sanitization for activity names and log notes.
//!
//! Tags are stripped, the five common entities are decoded until the text
//! stops changing, then angle brackets are re-escaped. Decoding to a fixed
//! point collapses double-encoded payloads (`&amp;lt;script&amp;gt;`) to the
//! same canonical output as their plain form, which also makes the function
//! idempotent.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:lt|gt|amp|quot|#x27);").expect("valid entity regex"));

/// Sanitize a free-text field.
///
/// Applied only to activity names and log notes; identifiers, colors and
/// dates are restricted to safe characters by the validator instead.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    let decoded = decode_entities(&stripped);
    let escaped = decoded.replace('<', "&lt;").replace('>', "&gt;");
    escaped.trim().to_string()
}

/// Decode entities repeatedly until no entity remains.
///
/// Every pass shortens the text, so this terminates.
fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let decoded = ENTITY_RE
            .replace_all(&current, |caps: &Captures| match &caps[0] {
                "&lt;" => "<",
                "&gt;" => ">",
                "&amp;" => "&",
                "&quot;" => "\"",
                _ => "'",
            })
            .into_owned();
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

/// Truncate to at most `max` characters.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
