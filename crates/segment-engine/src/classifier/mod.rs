//! Segment classification.
//!
//! Two families of input:
//! - [`amplitude`]: per-chunk loudness, producing keep-spans directly
//! - [`events`]: filler words and sound events, producing drop candidates
//!   that still need merging and inversion

pub mod amplitude;
pub mod events;

pub use amplitude::{AmplitudeSampler, ChunkActivity, ChunkAnalysis, LoudnessClassifier};
pub use events::{detect_filler_spans, detect_sound_spans, normalize_label};
