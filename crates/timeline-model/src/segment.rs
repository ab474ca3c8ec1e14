//! Time intervals and ordered interval sets.
//!
//! A [`TimeSegment`] always satisfies `start < end`; a [`SegmentSet`] is
//! always sorted by start with no two members overlapping. Both invariants
//! are enforced at construction so downstream code never re-checks them.

use serde::{Deserialize, Serialize};

/// Errors raised when building segments or segment sets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    #[error("Invalid segment bounds: start {start} must be >= 0 and < end {end}")]
    InvalidBounds { start: f64, end: f64 },

    #[error("Segment {index} starts at {start} before the previous segment ends at {previous_end}")]
    Overlap {
        index: usize,
        previous_end: f64,
        start: f64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawSegment {
    start: f64,
    end: f64,
}

/// A half-open interval `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegment", into = "RawSegment")]
pub struct TimeSegment {
    start: f64,
    end: f64,
}

impl TimeSegment {
    /// Create a segment. Fails unless `0 <= start < end` and both are finite.
    pub fn new(start: f64, end: f64) -> Result<Self, SegmentError> {
        if start.is_finite() && end.is_finite() && start >= 0.0 && start < end {
            Ok(Self { start, end })
        } else {
            Err(SegmentError::InvalidBounds { start, end })
        }
    }

    /// Start time (seconds).
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End time (seconds).
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the segment in seconds. Always positive.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the instant `t` falls inside `[start, end)`.
    pub fn contains_time(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    /// Whether `other` lies entirely within this segment.
    pub fn contains(&self, other: &TimeSegment) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether the two segments share a positive-length stretch of time.
    /// Segments that merely touch do not overlap.
    pub fn overlaps(&self, other: &TimeSegment) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Signed gap from the end of this segment to the start of `next`.
    /// Negative when they overlap, zero when they touch.
    pub fn gap_to(&self, next: &TimeSegment) -> f64 {
        next.start - self.end
    }

    /// Whether the segment lies inside `[0, total_secs]`.
    pub fn is_valid_within(&self, total_secs: f64) -> bool {
        self.start >= 0.0 && self.end <= total_secs
    }

    /// Clip the segment to `[0, total_secs]`. `None` if nothing remains.
    pub fn clamp_to(&self, total_secs: f64) -> Option<TimeSegment> {
        TimeSegment::new(self.start, self.end.min(total_secs)).ok()
    }

    /// Same start, end pushed out to `max(self.end, end)`.
    pub fn extended_to(&self, end: f64) -> TimeSegment {
        TimeSegment {
            start: self.start,
            end: self.end.max(end),
        }
    }
}

impl TryFrom<RawSegment> for TimeSegment {
    type Error = SegmentError;

    fn try_from(raw: RawSegment) -> Result<Self, Self::Error> {
        TimeSegment::new(raw.start, raw.end)
    }
}

impl From<TimeSegment> for RawSegment {
    fn from(segment: TimeSegment) -> Self {
        RawSegment {
            start: segment.start,
            end: segment.end,
        }
    }
}

impl std::fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s - {:.3}s", self.start, self.end)
    }
}

/// Segments sorted by start with no overlap between neighbours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimeSegment>", into = "Vec<TimeSegment>")]
pub struct SegmentSet {
    segments: Vec<TimeSegment>,
}

impl SegmentSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from segments that are already sorted and non-overlapping.
    pub fn from_sorted(segments: Vec<TimeSegment>) -> Result<Self, SegmentError> {
        let mut set = Self::new();
        for segment in segments {
            set.try_push(segment)?;
        }
        Ok(set)
    }

    /// Append a segment that starts no earlier than the current last end.
    pub fn try_push(&mut self, segment: TimeSegment) -> Result<(), SegmentError> {
        if let Some(last) = self.segments.last() {
            if segment.start < last.end {
                return Err(SegmentError::Overlap {
                    index: self.segments.len(),
                    previous_end: last.end,
                    start: segment.start,
                });
            }
        }
        self.segments.push(segment);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSegment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[TimeSegment] {
        &self.segments
    }

    pub fn into_vec(self) -> Vec<TimeSegment> {
        self.segments
    }

    /// Sum of member durations.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(TimeSegment::duration).sum()
    }

    /// The member containing instant `t`, if any.
    pub fn find(&self, t: f64) -> Option<&TimeSegment> {
        self.segments.iter().find(|s| s.contains_time(t))
    }

    /// Whether every member lies inside `[0, total_secs]`.
    pub fn is_valid_within(&self, total_secs: f64) -> bool {
        self.segments.iter().all(|s| s.is_valid_within(total_secs))
    }

    /// `(start, end)` pairs, convenient for assertions and logging.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.segments.iter().map(|s| (s.start, s.end)).collect()
    }
}

impl TryFrom<Vec<TimeSegment>> for SegmentSet {
    type Error = SegmentError;

    fn try_from(segments: Vec<TimeSegment>) -> Result<Self, Self::Error> {
        SegmentSet::from_sorted(segments)
    }
}

impl From<SegmentSet> for Vec<TimeSegment> {
    fn from(set: SegmentSet) -> Self {
        set.segments
    }
}

impl IntoIterator for SegmentSet {
    type Item = TimeSegment;
    type IntoIter = std::vec::IntoIter<TimeSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a SegmentSet {
    type Item = &'a TimeSegment;
    type IntoIter = std::slice::Iter<'a, TimeSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
