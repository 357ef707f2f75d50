//! Whitespace normalization for markup text
//!
//! Pretty-printed exports wrap long values across indented lines. Every
//! newline together with the whitespace that follows it becomes a single
//! space, and the ends are trimmed. Runs of spaces inside one line are
//! left alone.

use once_cell::sync::Lazy;
use regex::Regex;

static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*").expect("newline run regex"));

/// Collapse newline+indentation runs to one space and trim both ends
pub fn cleanup_string(text: &str) -> String {
    NEWLINE_RUN.replace_all(text, " ").trim().to_string()
}
