//! Projection of raw sentiment scores onto a fixed total of 10.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Total every normalized breakdown is scaled to.
pub const SCORE_TOTAL: f64 = 10.0;

const DEFAULT_CATEGORIES: [&str; 3] = ["positive", "negative", "neutral"];

/// Category name to score, in the order the model returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScores(pub IndexMap<String, f64>);

impl SentimentScores {
    /// `{positive: 0, negative: 0, neutral: 0}`, used whenever the model's
    /// scores cannot be normalized.
    pub fn zeroed() -> Self {
        Self(
            DEFAULT_CATEGORIES
                .iter()
                .map(|category| (category.to_string(), 0.0))
                .collect(),
        )
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Rescales a sentiment object so its values sum to [`SCORE_TOTAL`].
///
/// Each value is rounded to 2 decimals before and after scaling, and the
/// per-key rounding drift is left in place. Anything that is not an object of
/// numeric values, or whose values sum to zero, yields
/// [`SentimentScores::zeroed`].
pub fn normalize_scores(sentiment: &Value) -> SentimentScores {
    let Some(raw) = coerce_scores(sentiment) else {
        return SentimentScores::zeroed();
    };

    let total: f64 = raw.values().sum();
    if total == 0.0 {
        return SentimentScores::zeroed();
    }

    SentimentScores(
        raw.into_iter()
            .map(|(category, score)| (category, round2(score / total * SCORE_TOTAL)))
            .collect(),
    )
}

fn coerce_scores(sentiment: &Value) -> Option<IndexMap<String, f64>> {
    let object = sentiment.as_object()?;
    object
        .iter()
        .map(|(category, value)| Some((category.clone(), round2(coerce_number(value)?))))
        .collect()
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Rounds to 2 decimals from the exact binary value, ties to even.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
