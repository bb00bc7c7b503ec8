//! Tag extraction from raw model replies
//!
//! Leftmost, lazy, non-nested matching of `<tag>...</tag>`. This is not an
//! XML parser: nested or unbalanced tags are not detected, later occurrences
//! of the same tag are ignored.

use regex::Regex;

pub const QUESTION: &str = "question";
pub const THOUGHT: &str = "thought";
pub const ACTION: &str = "action";
pub const OBSERVATION: &str = "observation";
pub const FINAL_ANSWER: &str = "final_answer";

/// Return the trimmed content of the first `<tag>...</tag>` pair in `content`
///
/// Matching is case-sensitive and spans newlines. `None` means no complete
/// pair was found.
pub fn extract_tag(content: &str, tag: &str) -> Option<String> {
    let escaped = regex::escape(tag);
    let pattern = format!("(?s)<{escaped}>(.*?)</{escaped}>");
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("[Tags] Invalid tag pattern for '{}': {}", tag, e);
            return None;
        }
    };

    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Wrap `content` in `<tag>...</tag>`
pub fn wrap_tag(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}
