//! Word-level transcript records.
//!
//! Mirrors the JSON emitted by whisper.cpp with word timestamps enabled:
//!
//! ```json
//! {"transcription": [{"text": " Um", "timestamps": {"from": "00:00:01,000", "to": "00:00:01,500"}}]}
//! ```
//!
//! Timestamps stay as strings here; the segment engine owns parsing them.

use serde::{Deserialize, Serialize};

/// `from`/`to` pair in `HH:MM:SS,mmm` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTimestamps {
    pub from: String,
    pub to: String,
}

/// A single transcribed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptWord {
    /// Raw token text, including leading whitespace and punctuation.
    pub text: String,
    pub timestamps: WordTimestamps,
}

impl TranscriptWord {
    pub fn new(text: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamps: WordTimestamps {
                from: from.into(),
                to: to.into(),
            },
        }
    }
}

/// A whole transcript file. Unknown top-level fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptDocument {
    #[serde(default)]
    pub transcription: Vec<TranscriptWord>,
}

impl TranscriptDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn words(&self) -> &[TranscriptWord] {
        &self.transcription
    }
}
