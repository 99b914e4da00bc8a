//! Keyword extraction shared by artifacts and observation groups

use std::collections::HashSet;

/// Tokens must be strictly longer than this
pub const MIN_KEYWORD_LEN: usize = 3;

/// Lowercase alphanumeric tokens longer than 3 characters, deduplicated.
///
/// Everything that is not alphanumeric splits tokens, so `pre-commit`
/// yields `commit` only.
pub fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
        .map(|w| w.to_string())
        .collect()
}
