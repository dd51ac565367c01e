//! Turning a raw model score into a labeled prediction.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::{Result, SentimentError};
use crate::models::RawScore;

/// Scores strictly above this value select the high-score label.
pub const THRESHOLD: f32 = 0.5;

/// Which label a high scalar score stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// A high score means positive sentiment.
    Direct,
    /// A high score means negative sentiment ("bad buzz" probability).
    #[default]
    Inverted,
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Polarity::Direct),
            "inverted" => Ok(Polarity::Inverted),
            other => Err(format!("expected `direct` or `inverted`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Positive,
    Negative,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Positive => f.write_str("Positive"),
            Label::Negative => f.write_str("Negative"),
        }
    }
}

/// Response body of a successful prediction.
///
/// `confidence_score` is the raw model score, not the confidence in the
/// returned label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: Label,
    pub confidence_score: f32,
}

fn check_probability(value: f32) -> Result<f32> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(SentimentError::Inference(format!(
            "model produced score {value} outside [0, 1]"
        )))
    }
}

/// Apply the fixed threshold to a raw score.
pub fn decide(raw: RawScore, polarity: Polarity) -> Result<Prediction> {
    match raw {
        RawScore::Probabilities([negative, positive]) => {
            check_probability(negative)?;
            let positive = check_probability(positive)?;
            let prediction = if positive > THRESHOLD {
                Label::Positive
            } else {
                Label::Negative
            };
            Ok(Prediction {
                prediction,
                confidence_score: positive,
            })
        }
        RawScore::Scalar(score) => {
            let score = check_probability(score)?;
            // The boundary resolves to Negative under either polarity.
            let prediction = match polarity {
                Polarity::Inverted if score > THRESHOLD => Label::Negative,
                Polarity::Inverted if score < THRESHOLD => Label::Positive,
                Polarity::Direct if score > THRESHOLD => Label::Positive,
                _ => Label::Negative,
            };
            Ok(Prediction {
                prediction,
                confidence_score: score,
            })
        }
    }
}
