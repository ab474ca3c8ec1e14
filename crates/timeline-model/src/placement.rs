//! The assembled output timeline.
//!
//! A [`PlacementPlan`] says where each kept source span lands on the output
//! timeline and how it fades. It is built once by the assembler and then
//! only read.

use serde::{Deserialize, Serialize};

use crate::segment::TimeSegment;

/// How kept spans are joined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssemblyMode {
    /// Hard cuts, spans laid back to back.
    Concatenate,
    /// Neighbouring spans overlap and blend for `overlap_secs`.
    Crossfade { overlap_secs: f64 },
}

impl AssemblyMode {
    /// Overlap between neighbours (zero for hard cuts).
    pub fn overlap_secs(&self) -> f64 {
        match self {
            AssemblyMode::Concatenate => 0.0,
            AssemblyMode::Crossfade { overlap_secs } => *overlap_secs,
        }
    }
}

/// One kept source span positioned on the output timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Span of the source media to play.
    pub source: TimeSegment,
    /// Where playback of the span begins in the output (seconds).
    pub output_start: f64,
    /// Fade-in length at the head of the span (seconds, 0 for none).
    pub fade_in: f64,
    /// Fade-out length at the tail of the span (seconds, 0 for none).
    pub fade_out: f64,
}

impl Placement {
    /// Output duration, identical to the source span's duration.
    pub fn duration(&self) -> f64 {
        self.source.duration()
    }

    /// Where the span stops playing in the output.
    pub fn output_end(&self) -> f64 {
        self.output_start + self.duration()
    }
}

/// Ordered placements plus the mode that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementPlan {
    mode: AssemblyMode,
    placements: Vec<Placement>,
}

impl PlacementPlan {
    pub fn new(mode: AssemblyMode, placements: Vec<Placement>) -> Self {
        Self { mode, placements }
    }

    pub fn mode(&self) -> AssemblyMode {
        self.mode
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Length of the assembled output timeline.
    pub fn output_duration(&self) -> f64 {
        self.placements
            .iter()
            .map(Placement::output_end)
            .fold(0.0_f64, f64::max)
    }

    /// Total source time that ends up in the output.
    pub fn source_duration(&self) -> f64 {
        self.placements.iter().map(Placement::duration).sum()
    }

    /// Output start offsets in order.
    pub fn output_starts(&self) -> Vec<f64> {
        self.placements.iter().map(|p| p.output_start).collect()
    }
}
