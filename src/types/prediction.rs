//! Prediction result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binary verdict for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Fraud,
    Legitimate,
}

impl Verdict {
    /// Fraud when the probability reaches the threshold (inclusive).
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Verdict::Fraud
        } else {
            Verdict::Legitimate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Fraud => "FRAUD",
            Verdict::Legitimate => "LEGITIMATE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored transaction returned to the form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Identifier used to correlate logs for this submission
    pub request_id: Uuid,

    /// Positive-class (fraud) probability, 0.0 - 1.0
    pub probability: f64,

    /// Verdict at the configured threshold
    pub label: Verdict,

    /// Probability as a truncated whole percentage
    pub percent: u8,

    /// When the classifier was invoked
    pub scored_at: DateTime<Utc>,
}

impl PredictionResult {
    pub fn new(probability: f64, threshold: f64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            probability,
            label: Verdict::from_probability(probability, threshold),
            percent: truncated_percent(probability),
            scored_at: Utc::now(),
        }
    }

    pub fn is_fraud(&self) -> bool {
        self.label == Verdict::Fraud
    }
}

/// Whole percentage, truncated toward zero (0.567 -> 56).
pub fn truncated_percent(probability: f64) -> u8 {
    (probability * 100.0).clamp(0.0, 100.0) as u8
}

/// What a submission ends in: a verdict or a user-visible error.
#[derive(Debug, Clone)]
pub enum PredictionOutcome {
    Predicted(PredictionResult),
    Failed { message: String },
}

impl PredictionOutcome {
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Predicted(result) => Some(result),
            PredictionOutcome::Failed { .. } => None,
        }
    }
}
