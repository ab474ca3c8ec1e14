//! Coverage accounting for a cut.

use serde::{Deserialize, Serialize};

use quietcut_timeline_model::{PlacementPlan, SegmentSet};

/// How much of the source survives a cut, and how long the result runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_secs: f64,
    pub kept_secs: f64,
    pub removed_secs: f64,
    /// Assembled length; shorter than `kept_secs` when crossfading.
    pub output_secs: f64,
    pub keep_count: usize,
}

impl CoverageReport {
    /// Account for `keep` within `[0, total_secs)`.
    ///
    /// `plan` is `None` when nothing was assembled.
    pub fn new(keep: &SegmentSet, plan: Option<&PlacementPlan>, total_secs: f64) -> Self {
        let kept_secs = keep.total_duration();
        Self {
            total_secs,
            kept_secs,
            removed_secs: (total_secs - kept_secs).max(0.0),
            output_secs: plan.map_or(0.0, PlacementPlan::output_duration),
            keep_count: keep.len(),
        }
    }

    /// Fraction of the source removed, in `[0, 1]`.
    pub fn removed_ratio(&self) -> f64 {
        if self.total_secs > 0.0 {
            (self.removed_secs / self.total_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use quietcut_timeline_model::{AssemblyMode, TimeSegment};

    #[test]
    fn test_kept_plus_removed_is_total() {
        let keep = SegmentSet::from_sorted(vec![
            TimeSegment::new(0.0, 1.0).unwrap(),
            TimeSegment::new(2.0, 4.0).unwrap(),
            TimeSegment::new(5.0, 10.0).unwrap(),
        ])
        .unwrap();
        let plan = assemble(&keep, AssemblyMode::Crossfade { overlap_secs: 0.5 }).unwrap();
        let report = CoverageReport::new(&keep, Some(&plan), 10.0);

        assert_eq!(report.keep_count, 3);
        assert!((report.kept_secs + report.removed_secs - report.total_secs).abs() < 1e-9);
        assert!((report.removed_secs - 2.0).abs() < 1e-9);
        assert!((report.output_secs - 7.0).abs() < 1e-9);
        assert!((report.removed_ratio() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_kept() {
        let report = CoverageReport::new(&SegmentSet::new(), None, 4.0);
        assert_eq!(report.keep_count, 0);
        assert_eq!(report.output_secs, 0.0);
        assert_eq!(report.removed_ratio(), 1.0);
    }
}
