//! QuietCut Timeline Model
//!
//! Defines the data contracts shared by the segment engine and its
//! collaborators:
//! - **Segments:** `(start, end)` intervals and sorted, non-overlapping sets
//! - **Placement:** the assembled output timeline handed to the export driver
//! - **Transcript:** word records produced by speech-to-text
//! - **Sound events:** labelled frames produced by an audio event classifier
//!
//! All times are seconds measured from the start of the source media.

pub mod placement;
pub mod segment;
pub mod sound_event;
pub mod transcript;

pub use placement::*;
pub use segment::*;
pub use sound_event::*;
pub use transcript::*;
