//! Best-effort recovery of near-JSON model output.
//!
//! Models asked for JSON sometimes answer with unquoted keys, single quotes
//! or trailing commas. [`recover_json`] rewrites those with a handful of
//! regex passes and parses again. It is lossy: the bare-key pass runs over
//! the whole text, so a string value containing `word:` gets quoted too.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):").unwrap());
static TRAILING_COMMA_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\}").unwrap());
static TRAILING_COMMA_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\]").unwrap());

/// Parses `raw` strictly, falling back to one repaired attempt.
///
/// Returns `None` when neither parse succeeds.
pub fn recover_json(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }
    serde_json::from_str(&repair(raw)).ok()
}

fn repair(raw: &str) -> String {
    let quoted_keys = BARE_KEY.replace_all(raw, "\"$1\":");
    let double_quoted = quoted_keys.replace('\'', "\"");
    let objects = TRAILING_COMMA_OBJECT.replace_all(&double_quoted, "}");
    TRAILING_COMMA_ARRAY.replace_all(&objects, "]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_matches_strict_parse() {
        let samples = [
            r#"{"sentiment": {"positive": 8, "negative": 1, "neutral": 1}}"#,
            r#"[1, 2.5, "three", null, true]"#,
            r#""just a string""#,
            "42",
            r#"{"note": "time: 10:30, 'quoted'"}"#,
        ];
        for sample in samples {
            let strict: Value = serde_json::from_str(sample).unwrap();
            assert_eq!(recover_json(sample), Some(strict));
        }
    }

    #[test]
    fn test_repairs_mixed_malformations() {
        let recovered = recover_json(r#"{"positive": 5, negative: 3, 'neutral': 2,}"#);
        assert_eq!(recovered, Some(json!({"positive": 5, "negative": 3, "neutral": 2})));
    }

    #[test]
    fn test_repairs_nested_sentiment_object() {
        let raw = "{sentiment: {positive: 6, negative: 2, neutral: 2,},}";
        let recovered = recover_json(raw).unwrap();
        assert_eq!(recovered["sentiment"]["positive"], json!(6));
        assert_eq!(recovered["sentiment"]["neutral"], json!(2));
    }

    #[test]
    fn test_repairs_trailing_comma_in_array() {
        assert_eq!(recover_json("{'scores': [1, 2, 3, ]}"), Some(json!({"scores": [1, 2, 3]})));
    }

    #[test]
    fn test_unrecoverable_text_is_none() {
        assert_eq!(recover_json("I think this review is mostly positive."), None);
        assert_eq!(recover_json(""), None);
        assert_eq!(recover_json("{\"positive\": 5"), None);
    }

    #[test]
    fn test_bare_key_pass_also_rewrites_string_values() {
        // Known limitation: `note:` inside a value is quoted as if it were a key.
        let raw = "{'note': 'note: fine', positive: 1}";
        assert_eq!(recover_json(raw), None);
    }
}
