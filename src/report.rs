//! Turns a prediction into the verdict shown to the operator.

use crate::ml::{ChurnLabel, ChurnPrediction};
use serde::{Deserialize, Serialize};

pub const DISCLAIMER: &str =
    "This prediction is based on the data you provided and may not be 100% accurate.";

/// Visual style of the result area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Error,
    Success,
}

/// Human-readable verdict for one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: ChurnLabel,
    pub tone: Tone,
    pub headline: String,
    /// "Probability of churn" or "Confidence you will stay"
    pub probability_label: String,
    /// Probability of the predicted outcome
    pub probability: f64,
    /// `probability` with two decimals
    pub probability_text: String,
    /// Indicator position on 0..=100
    pub progress: u8,
    pub caption: String,
}

impl Verdict {
    pub fn from_prediction(prediction: &ChurnPrediction, name: &str) -> Self {
        let name = title_case(name.trim());
        let greeting = |lead: &str| {
            if name.is_empty() {
                format!("{}!", lead)
            } else {
                format!("{} {}!", lead, name)
            }
        };

        let (tone, headline, probability_label, probability) = match prediction.label {
            ChurnLabel::Churn => (
                Tone::Error,
                format!("{} The model predicts you might churn.", greeting("Sorry")),
                "Probability of churn",
                prediction.probability_churn,
            ),
            ChurnLabel::Stay => (
                Tone::Success,
                format!("{} The model predicts you will stay.", greeting("Good news")),
                "Confidence you will stay",
                prediction.probability_stay,
            ),
        };

        Self {
            outcome: prediction.label,
            tone,
            headline,
            probability_label: probability_label.to_string(),
            probability,
            probability_text: format!("{:.2}", probability),
            progress: progress_value(probability),
            caption: DISCLAIMER.to_string(),
        }
    }
}

/// Indicator value for a probability: `trunc(p * 100)`, clamped to 0..=100
pub fn progress_value(probability: f64) -> u8 {
    // `as` saturates and maps NaN to 0.
    let percent = (probability * 100.0) as i64;
    percent.clamp(0, 100) as u8
}

/// Capitalize the first letter of each word and lowercase the rest
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }

    out
}
