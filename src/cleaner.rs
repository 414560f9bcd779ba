//! Review text cleaning.
//!
//! Reviews are reduced to lowercase ASCII words separated by single spaces
//! before they are sent to the completion API.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans a review of any JSON type. Anything that is not a string cleans to
/// an empty string, which callers treat as invalid input.
pub fn clean_review(review: &Value) -> String {
    match review {
        Value::String(text) => clean_review_text(text),
        _ => String::new(),
    }
}

/// Lowercases, strips `<...>` tags, drops everything except ASCII letters and
/// whitespace, then collapses and trims whitespace.
pub fn clean_review_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let untagged = HTML_TAG.replace_all(&lowered, "");
    let letters = NON_LETTER.replace_all(&untagged, "");
    WHITESPACE_RUN.replace_all(&letters, " ").trim().to_string()
}
