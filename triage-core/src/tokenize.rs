//! Word tokenization shared by the sanitizer, the scorer, and the operator display.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of word characters between word boundaries.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("word regex is valid"));

/// Lowercase word tokens of `text`, in order of appearance.
pub fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Number of word tokens in `text`.
pub fn word_count(text: &str) -> usize {
    WORD_RE.find_iter(text).count()
}
