//! QuietCut Segment Engine
//!
//! Turns annotated timelines into cut plans:
//! - **Classifier:** loudness chunks, filler words, and sound events to keep/drop spans
//! - **Merger:** coalesce spans under a gap tolerance, invert drops into keeps
//! - **Assembler:** lay kept spans on an output timeline, hard cuts or crossfades
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod coverage;
pub mod error;
pub mod merger;
pub mod pipeline;
pub mod timestamp;

pub use assembler::assemble;
pub use classifier::{AmplitudeSampler, LoudnessClassifier};
pub use config::{EngineConfig, FillerSet};
pub use coverage::CoverageReport;
pub use error::{EngineError, EngineResult};
pub use merger::{invert_drop_spans, merge_close_segments};
pub use pipeline::{CutPlan, CutPlanner};
