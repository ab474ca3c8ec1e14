//! Labelled frames from an audio event classifier.

use serde::{Deserialize, Serialize};

/// The top-scoring class of one classifier frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    /// Class display name, e.g. "Cough" or "Throat clearing".
    pub label: String,
    /// Frame start (seconds).
    pub start_secs: f64,
    /// Frame end (seconds).
    pub end_secs: f64,
    /// Probability of the label in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl SoundEvent {
    pub fn new(label: impl Into<String>, start_secs: f64, end_secs: f64, confidence: f64) -> Self {
        Self {
            label: label.into(),
            start_secs,
            end_secs,
            confidence,
        }
    }
}
