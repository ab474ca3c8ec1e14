//! Timeline assembly: kept spans to a placement plan.
//!
//! Each placement's output start is derived from the previous placement
//! (`previous.output_end() - overlap`), so the plan is built as a single
//! fold over the keep-set with no running clock outside it.

use quietcut_timeline_model::{AssemblyMode, Placement, PlacementPlan, SegmentSet};

use crate::error::{EngineError, EngineResult};

/// Lay `keep` out on the output timeline.
///
/// Fails with [`EngineError::EmptySegmentSet`] when there is nothing to
/// place, and with [`EngineError::InvalidOverlap`] when a crossfade would
/// be at least as long as a span it fades.
pub fn assemble(keep: &SegmentSet, mode: AssemblyMode) -> EngineResult<PlacementPlan> {
    if keep.is_empty() {
        return Err(EngineError::EmptySegmentSet);
    }

    let overlap = match mode {
        AssemblyMode::Concatenate => 0.0,
        AssemblyMode::Crossfade { overlap_secs } => {
            if !(overlap_secs > 0.0) || !overlap_secs.is_finite() {
                return Err(EngineError::invalid_config(
                    "crossfade_overlap",
                    format!("{overlap_secs} must be a finite number > 0"),
                ));
            }
            // A lone span has no neighbour to fade against
            if keep.len() > 1 {
                if let Some((index, span)) = keep
                    .iter()
                    .enumerate()
                    .find(|(_, span)| overlap_secs >= span.duration())
                {
                    return Err(EngineError::InvalidOverlap {
                        index,
                        overlap_secs,
                        duration_secs: span.duration(),
                    });
                }
            }
            overlap_secs
        }
    };

    let last = keep.len() - 1;
    let placements = keep.iter().enumerate().fold(
        Vec::with_capacity(keep.len()),
        |mut placements: Vec<Placement>, (index, span)| {
            let output_start = placements
                .last()
                .map_or(0.0, |previous| previous.output_end() - overlap);
            placements.push(Placement {
                source: *span,
                output_start,
                fade_in: if index > 0 { overlap } else { 0.0 },
                fade_out: if index < last { overlap } else { 0.0 },
            });
            placements
        },
    );

    tracing::debug!(
        placements = placements.len(),
        overlap,
        "Assembled placement plan"
    );

    Ok(PlacementPlan::new(mode, placements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quietcut_timeline_model::TimeSegment;

    fn keep(bounds: &[(f64, f64)]) -> SegmentSet {
        SegmentSet::from_sorted(
            bounds
                .iter()
                .map(|&(s, e)| TimeSegment::new(s, e).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_set_is_reported() {
        assert_eq!(
            assemble(&SegmentSet::new(), AssemblyMode::Concatenate),
            Err(EngineError::EmptySegmentSet)
        );
    }

    #[test]
    fn test_concatenate_lays_spans_back_to_back() {
        let plan = assemble(&keep(&[(0.0, 1.0), (2.0, 4.0), (5.0, 10.0)]), AssemblyMode::Concatenate)
            .unwrap();
        assert_eq!(plan.output_starts(), vec![0.0, 1.0, 3.0]);
        assert!((plan.output_duration() - 8.0).abs() < 1e-12);
        assert!(plan
            .placements()
            .iter()
            .all(|p| p.fade_in == 0.0 && p.fade_out == 0.0));
    }

    #[test]
    fn test_crossfade_offsets_and_fades() {
        let plan = assemble(
            &keep(&[(0.0, 2.0), (3.0, 5.0), (6.0, 8.0)]),
            AssemblyMode::Crossfade { overlap_secs: 0.5 },
        )
        .unwrap();
        assert_eq!(plan.output_starts(), vec![0.0, 1.5, 3.0]);

        let p = plan.placements();
        assert_eq!((p[0].fade_in, p[0].fade_out), (0.0, 0.5));
        assert_eq!((p[1].fade_in, p[1].fade_out), (0.5, 0.5));
        assert_eq!((p[2].fade_in, p[2].fade_out), (0.5, 0.0));
        assert!((plan.output_duration() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_not_shorter_than_span_fails_with_index() {
        let err = assemble(
            &keep(&[(0.0, 2.0), (3.0, 3.4), (6.0, 8.0)]),
            AssemblyMode::Crossfade { overlap_secs: 0.5 },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOverlap { index: 1, .. }));

        let equal = assemble(
            &keep(&[(0.0, 0.5), (1.0, 2.0)]),
            AssemblyMode::Crossfade { overlap_secs: 0.5 },
        );
        assert!(matches!(equal, Err(EngineError::InvalidOverlap { index: 0, .. })));
    }

    #[test]
    fn test_single_span_needs_no_fade() {
        let plan = assemble(&keep(&[(1.0, 1.2)]), AssemblyMode::Crossfade { overlap_secs: 0.5 })
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.placements()[0].fade_in, 0.0);
        assert_eq!(plan.placements()[0].fade_out, 0.0);
    }

    #[test]
    fn test_non_positive_overlap_rejected() {
        let err = assemble(&keep(&[(0.0, 1.0)]), AssemblyMode::Crossfade { overlap_secs: 0.0 });
        assert!(matches!(err, Err(EngineError::InvalidConfiguration { .. })));
    }
}
