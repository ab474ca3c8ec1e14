//! Span merging and drop-span inversion.

use quietcut_timeline_model::{SegmentSet, TimeSegment};

use crate::error::{EngineError, EngineResult};

/// Merge spans whose gap is at most `gap_threshold` seconds.
///
/// Overlapping spans always merge (their gap is negative). The result is
/// the smallest sorted, non-overlapping set in which every input span sits
/// inside exactly one output span. Input that is not start-ordered is
/// stably sorted first.
pub fn merge_close_segments(
    mut segments: Vec<TimeSegment>,
    gap_threshold: f64,
) -> EngineResult<SegmentSet> {
    if !(gap_threshold >= 0.0) || !gap_threshold.is_finite() {
        return Err(EngineError::invalid_config(
            "merge_gap",
            format!("{gap_threshold} must be a finite number >= 0"),
        ));
    }

    segments.sort_by(|a, b| a.start().total_cmp(&b.start()));

    let mut merged = SegmentSet::new();
    let mut spans = segments.into_iter();
    let Some(mut current) = spans.next() else {
        return Ok(merged);
    };

    for next in spans {
        if current.gap_to(&next) <= gap_threshold {
            current = current.extended_to(next.end());
        } else {
            merged.try_push(current)?;
            current = next;
        }
    }
    merged.try_push(current)?;

    Ok(merged)
}

/// Complement of `drops` within `[0, total_duration_secs)`.
///
/// Yields the positive-length intervals before, between and after the
/// drop-spans. Drops reaching past the end are clipped.
pub fn invert_drop_spans(drops: &SegmentSet, total_duration_secs: f64) -> EngineResult<SegmentSet> {
    if !(total_duration_secs > 0.0) || !total_duration_secs.is_finite() {
        return Err(EngineError::invalid_config(
            "total_duration",
            format!("{total_duration_secs} must be a finite number > 0"),
        ));
    }

    let mut keep = SegmentSet::new();
    let mut cursor = 0.0_f64;

    for span in drops {
        if span.start() >= total_duration_secs {
            break;
        }
        if span.start() > cursor {
            keep.try_push(TimeSegment::new(cursor, span.start())?)?;
        }
        cursor = cursor.max(span.end());
    }

    if cursor < total_duration_secs {
        keep.try_push(TimeSegment::new(cursor, total_duration_secs)?)?;
    }

    Ok(keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(bounds: &[(f64, f64)]) -> Vec<TimeSegment> {
        bounds
            .iter()
            .map(|&(s, e)| TimeSegment::new(s, e).unwrap())
            .collect()
    }

    #[test]
    fn test_merges_within_gap() {
        let merged = merge_close_segments(segs(&[(0.0, 1.0), (1.01, 2.0), (3.0, 4.0)]), 0.05).unwrap();
        assert_eq!(merged.bounds(), vec![(0.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(merge_close_segments(vec![], 0.1).unwrap().is_empty());
        let single = merge_close_segments(segs(&[(2.0, 3.5)]), 0.1).unwrap();
        assert_eq!(single.bounds(), vec![(2.0, 3.5)]);
    }

    #[test]
    fn test_contained_span_does_not_shrink_current() {
        // Next span ends before the current one does
        let merged = merge_close_segments(segs(&[(0.0, 5.0), (1.0, 2.0), (6.0, 7.0)]), 0.0).unwrap();
        assert_eq!(merged.bounds(), vec![(0.0, 5.0), (6.0, 7.0)]);
    }

    #[test]
    fn test_touching_spans_merge_at_zero_gap() {
        let merged = merge_close_segments(segs(&[(0.0, 1.0), (1.0, 2.0)]), 0.0).unwrap();
        assert_eq!(merged.bounds(), vec![(0.0, 2.0)]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let merged = merge_close_segments(segs(&[(3.0, 4.0), (0.0, 1.0)]), 0.0).unwrap();
        assert_eq!(merged.bounds(), vec![(0.0, 1.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_rejects_negative_gap() {
        assert!(merge_close_segments(segs(&[(0.0, 1.0)]), -0.1).is_err());
    }

    #[test]
    fn test_inverts_drops() {
        let drops = SegmentSet::from_sorted(segs(&[(1.0, 2.0), (4.0, 5.0)])).unwrap();
        let keep = invert_drop_spans(&drops, 10.0).unwrap();
        assert_eq!(keep.bounds(), vec![(0.0, 1.0), (2.0, 4.0), (5.0, 10.0)]);
    }

    #[test]
    fn test_invert_edges() {
        let at_edges = SegmentSet::from_sorted(segs(&[(0.0, 1.0), (9.0, 10.0)])).unwrap();
        assert_eq!(invert_drop_spans(&at_edges, 10.0).unwrap().bounds(), vec![(1.0, 9.0)]);

        let past_end = SegmentSet::from_sorted(segs(&[(8.0, 12.0), (13.0, 14.0)])).unwrap();
        assert_eq!(invert_drop_spans(&past_end, 10.0).unwrap().bounds(), vec![(0.0, 8.0)]);

        let nothing = SegmentSet::new();
        assert_eq!(invert_drop_spans(&nothing, 4.0).unwrap().bounds(), vec![(0.0, 4.0)]);

        let everything = SegmentSet::from_sorted(segs(&[(0.0, 4.0)])).unwrap();
        assert!(invert_drop_spans(&everything, 4.0).unwrap().is_empty());
    }
}
