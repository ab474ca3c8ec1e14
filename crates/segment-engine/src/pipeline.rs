//! End-to-end cut planning.
//!
//! [`CutPlanner`] chains classifier, merger and assembler for each input
//! kind:
//!
//! ```text
//! samples  ─► LoudnessClassifier ─► merge(gap)? ──────────► keep ─┐
//! words    ─► detect_filler_spans ─► merge(gap) ─► invert ─► keep ─┼─► assemble
//! events   ─► detect_sound_spans  ─► merge(gap) ─► invert ─► keep ─┘
//! ```
//!
//! With merging disabled, loud chunks stay separate and drops merge only
//! when they touch or overlap. Event keep-spans are exactly the complement
//! of the reported drops, so every reported drop is cut.

use serde::Serialize;

use quietcut_timeline_model::{
    PlacementPlan, SegmentSet, SoundEvent, TimeSegment, TranscriptWord,
};

use crate::assembler::assemble;
use crate::classifier::{
    detect_filler_spans, detect_sound_spans, AmplitudeSampler, LoudnessClassifier,
};
use crate::config::EngineConfig;
use crate::coverage::CoverageReport;
use crate::error::EngineResult;
use crate::merger::{invert_drop_spans, merge_close_segments};

/// Outcome of one planning run.
#[derive(Debug, Clone, Serialize)]
pub struct CutPlan {
    /// Spans that survive, after merging.
    pub keep: SegmentSet,
    /// Merged drop-spans for event-based input, `None` for loudness input.
    pub drops: Option<SegmentSet>,
    pub plan: PlacementPlan,
    pub coverage: CoverageReport,
}

/// Builds cut plans from a validated [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct CutPlanner {
    config: EngineConfig,
}

impl CutPlanner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Silence removal: keep the loud chunks.
    pub fn plan_silence<S: AmplitudeSampler + ?Sized>(&self, sampler: &S) -> EngineResult<CutPlan> {
        let loud = LoudnessClassifier::from_config(&self.config).classify(sampler)?;
        tracing::info!(loud_chunks = loud.len(), "Loudness classification complete");
        let keep = if self.config.merge() {
            merge_close_segments(loud.into_vec(), self.config.merge_gap_secs())?
        } else {
            loud
        };
        self.finish(keep, None)
    }

    /// Filler removal from a word-level transcript.
    pub fn plan_fillers(&self, words: &[TranscriptWord]) -> EngineResult<CutPlan> {
        let candidates = detect_filler_spans(words, self.config.fillers())?;
        tracing::info!(
            words = words.len(),
            fillers = candidates.len(),
            "Filler detection complete"
        );
        self.plan_from_drops(candidates)
    }

    /// Cough and throat-clearing removal from sound-event frames.
    pub fn plan_sounds(&self, events: &[SoundEvent]) -> EngineResult<CutPlan> {
        let candidates = detect_sound_spans(
            events,
            self.config.sound_labels(),
            self.config.min_sound_confidence(),
        )?;
        tracing::info!(
            events = events.len(),
            matched = candidates.len(),
            "Sound event detection complete"
        );
        self.plan_from_drops(candidates)
    }

    fn plan_from_drops(&self, candidates: Vec<TimeSegment>) -> EngineResult<CutPlan> {
        let drops = merge_close_segments(candidates, self.drop_merge_gap_secs())?;
        let keep = invert_drop_spans(&drops, self.config.total_duration_secs())?;
        self.finish(keep, Some(drops))
    }

    /// Gap used to coalesce drop candidates.
    fn drop_merge_gap_secs(&self) -> f64 {
        if self.config.merge() {
            self.config.merge_gap_secs()
        } else {
            0.0
        }
    }

    fn finish(&self, keep: SegmentSet, drops: Option<SegmentSet>) -> EngineResult<CutPlan> {
        let plan = assemble(&keep, self.config.assembly())?;
        let coverage = CoverageReport::new(&keep, Some(&plan), self.config.total_duration_secs());

        tracing::info!(
            keep = coverage.keep_count,
            kept_secs = coverage.kept_secs,
            removed_secs = coverage.removed_secs,
            output_secs = coverage.output_secs,
            "Cut plan ready"
        );

        Ok(CutPlan {
            keep,
            drops,
            plan,
            coverage,
        })
    }
}
