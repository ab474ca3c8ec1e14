//! QuietCut Render Engine
//!
//! Turns a placement plan back into a video file.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mov ──► trim/atrim per placement ──┐
//!                                           ├── concat            (hard cuts)
//! plan ─────────────────────────────────────┤
//!                                           └── xfade/acrossfade  (crossfades)
//!                                                      │
//!                                                      ▼
//!                                           Encode (H.264 + AAC)
//!                                                      │
//!                                                      ▼
//!                                     output.mov + output.cuts.json
//! ```

pub mod export;
pub mod probe;

pub use export::*;
pub use probe::*;
