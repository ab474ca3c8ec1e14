//! Amplitude-based keep detection (silence removal).
//!
//! # Algorithm
//!
//! 1. **Chunk** `[0, D)` into windows of the configured length. The last
//!    window may be shorter; a recording shorter than one chunk has none.
//! 2. **Sample** each window through an [`AmplitudeSampler`].
//! 3. **Classify**: a window is kept iff it has samples and its peak
//!    absolute amplitude is strictly above the threshold.

use std::borrow::Cow;

use quietcut_timeline_model::{SegmentSet, TimeSegment};

use crate::config::EngineConfig;
use crate::error::EngineResult;

/// Tolerance used when deciding whether a trailing partial chunk exists.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Source of raw samples for a time window.
pub trait AmplitudeSampler {
    /// Samples covering `window`, or `None` when there is no audio track.
    fn sample(&self, window: &TimeSegment) -> Option<Cow<'_, [f32]>>;
}

impl<F> AmplitudeSampler for F
where
    F: Fn(&TimeSegment) -> Option<Vec<f32>>,
{
    fn sample(&self, window: &TimeSegment) -> Option<Cow<'_, [f32]>> {
        self(window).map(Cow::Owned)
    }
}

/// Loudness verdict for one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkActivity {
    /// Peak above threshold, kept.
    Loud,
    /// Peak at or below threshold, or no samples.
    Quiet,
    /// Sampler reported no audio track.
    NoAudio,
}

/// Analysis result for a single chunk.
#[derive(Debug, Clone)]
pub struct ChunkAnalysis {
    pub window: TimeSegment,
    /// Peak absolute amplitude, `None` when there was no audio.
    pub peak: Option<f32>,
    pub activity: ChunkActivity,
}

/// Chunked loudness classifier.
#[derive(Debug, Clone)]
pub struct LoudnessClassifier {
    chunk_duration_secs: f64,
    silence_threshold: f64,
    total_duration_secs: f64,
}

impl LoudnessClassifier {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            chunk_duration_secs: config.chunk_duration_secs(),
            silence_threshold: config.silence_threshold(),
            total_duration_secs: config.total_duration_secs(),
        }
    }

    /// Kept chunk spans in chunk order.
    pub fn classify<S: AmplitudeSampler + ?Sized>(&self, sampler: &S) -> EngineResult<SegmentSet> {
        let (kept, _) = self.classify_with_chunks(sampler)?;
        Ok(kept)
    }

    /// Kept spans plus per-chunk diagnostics.
    pub fn classify_with_chunks<S: AmplitudeSampler + ?Sized>(
        &self,
        sampler: &S,
    ) -> EngineResult<(SegmentSet, Vec<ChunkAnalysis>)> {
        let windows = self.chunk_windows()?;
        let mut kept = SegmentSet::new();
        let mut chunks = Vec::with_capacity(windows.len());

        for window in windows {
            let analysis = match sampler.sample(&window) {
                None => {
                    tracing::debug!(%window, "Chunk has no audio, treating as quiet");
                    ChunkAnalysis {
                        window,
                        peak: None,
                        activity: ChunkActivity::NoAudio,
                    }
                }
                Some(samples) => {
                    let peak = peak_amplitude(&samples);
                    let loud = !samples.is_empty() && f64::from(peak) > self.silence_threshold;
                    ChunkAnalysis {
                        window,
                        peak: Some(peak),
                        activity: if loud {
                            ChunkActivity::Loud
                        } else {
                            ChunkActivity::Quiet
                        },
                    }
                }
            };

            if analysis.activity == ChunkActivity::Loud {
                kept.try_push(window)?;
            }
            chunks.push(analysis);
        }

        tracing::debug!(
            chunks = chunks.len(),
            loud = kept.len(),
            threshold = self.silence_threshold,
            "Classified loudness chunks"
        );

        Ok((kept, chunks))
    }

    /// The chunk windows covering `[0, D)`.
    pub fn chunk_windows(&self) -> EngineResult<Vec<TimeSegment>> {
        let chunk = self.chunk_duration_secs;
        let total = self.total_duration_secs;
        let full_chunks = (total / chunk + BOUNDARY_EPSILON).floor() as usize;

        if full_chunks == 0 {
            return Ok(vec![]);
        }

        let mut windows = Vec::with_capacity(full_chunks + 1);
        for i in 0..full_chunks {
            let start = i as f64 * chunk;
            let end = ((i + 1) as f64 * chunk).min(total);
            windows.push(TimeSegment::new(start, end)?);
        }

        let tail_start = full_chunks as f64 * chunk;
        if total - tail_start > BOUNDARY_EPSILON {
            windows.push(TimeSegment::new(tail_start, total)?);
        }

        Ok(windows)
    }
}

fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()))
}
