//! Text utilities for matching hand-authored slide labels.
//!
//! The deck this tool edits was authored by hand, so shape text can carry
//! stray newlines, double spaces, and (because macOS saves decomposed
//! Hangul) differently-normalized Korean. Every comparison against an
//! expected label goes through whitespace compaction and NFC normalization.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of whitespace (including newlines) into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse all interior whitespace to single spaces and trim the ends.
pub fn compact(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Compacted, NFC-normalized form used for label comparison.
fn canonical(text: &str) -> String {
    compact(text).nfc().collect()
}

/// Whether two strings are the same label, ignoring whitespace layout and
/// Unicode normalization form.
pub fn matches_label(text: &str, label: &str) -> bool {
    canonical(text) == canonical(label)
}

/// Whether `needle` occurs inside `haystack` after canonicalization.
pub fn contains_label(haystack: &str, needle: &str) -> bool {
    canonical(haystack).contains(&canonical(needle))
}

/// Truncate to at most `max_chars` characters, appending an ellipsis when
/// anything was cut. Operates on characters, not bytes, so multi-byte
/// Hangul never gets split.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}
