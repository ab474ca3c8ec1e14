//! QuietCut Audio Intelligence
//!
//! Adapters between media files and the segment engine:
//! - **Amplitude:** decode the audio track to PCM and serve chunk samples
//! - **Transcription:** whisper.cpp word-level transcripts, cached beside the media
//! - **Sound Events:** per-frame classifier scores to labelled events

pub mod amplitude;
pub mod sound_events;
pub mod transcription;

pub use amplitude::*;
pub use sound_events::*;
pub use transcription::*;
