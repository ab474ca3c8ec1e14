//! Engine error taxonomy.
//!
//! Every failure here is a deterministic consequence of the input, so
//! nothing is retried or partially applied; callers decide how to report.

use quietcut_timeline_model::SegmentError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("Malformed timestamp {value:?}: expected HH:MM:SS,mmm")]
    MalformedTimestamp { value: String },

    #[error("No segments left to assemble")]
    EmptySegmentSet,

    #[error(
        "Crossfade overlap {overlap_secs}s is not shorter than span {index} ({duration_secs}s)"
    )]
    InvalidOverlap {
        index: usize,
        overlap_secs: f64,
        duration_secs: f64,
    },

    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
