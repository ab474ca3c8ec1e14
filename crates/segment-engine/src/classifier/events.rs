//! Event-span drop detection (filler words and sound events).
//!
//! Produces drop candidates in document order. Candidates may overlap or
//! touch; callers merge them before inverting into keep-spans.

use once_cell::sync::Lazy;
use regex::Regex;

use quietcut_timeline_model::{SoundEvent, TimeSegment, TranscriptWord};

use crate::config::FillerSet;
use crate::error::{EngineError, EngineResult};
use crate::timestamp::parse_timestamp;

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").expect("valid label regex"));

/// Sentence-initial "so" is a connective, not a filler.
const SENTENCE_START_EXEMPT: &str = "so";

/// Lowercase and strip every non-word character.
///
/// `" Um,"` and `"um"` both normalize to `"um"`; a token made only of
/// punctuation or whitespace normalizes to the empty string.
pub fn normalize_label(text: &str) -> String {
    NON_WORD_RE.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Drop candidates for every transcript word in `fillers`.
///
/// All timestamps are parsed, not just those of matching words, so a
/// transcript in an unexpected format fails fast. Zero-length words are
/// skipped because there is nothing to cut.
pub fn detect_filler_spans(
    words: &[TranscriptWord],
    fillers: &FillerSet,
) -> EngineResult<Vec<TimeSegment>> {
    let mut drops = Vec::new();
    let mut previous_normalized: Option<String> = None;

    for (index, word) in words.iter().enumerate() {
        let from = parse_timestamp(&word.timestamps.from)?;
        let to = parse_timestamp(&word.timestamps.to)?;
        let normalized = normalize_label(&word.text);

        let sentence_start = previous_normalized
            .as_deref()
            .map_or(true, |previous| previous.is_empty());
        let exempt = normalized == SENTENCE_START_EXEMPT && sentence_start;

        if fillers.contains(&normalized) && !exempt {
            if let Some(span) = candidate_span(from, to)? {
                tracing::debug!(index, word = %normalized, %span, "Filler word");
                drops.push(span);
            }
        }

        previous_normalized = Some(normalized);
    }

    tracing::debug!(words = words.len(), fillers = drops.len(), "Detected filler spans");
    Ok(drops)
}

/// Drop candidates for sound events whose label contains any of `labels`
/// (lowercase keywords) with confidence of at least `min_confidence`.
pub fn detect_sound_spans(
    events: &[SoundEvent],
    labels: &[String],
    min_confidence: f64,
) -> EngineResult<Vec<TimeSegment>> {
    let mut drops = Vec::new();

    for event in events {
        let label = event.label.to_lowercase();
        let matches = labels.iter().any(|keyword| label.contains(keyword.as_str()));
        if !matches || event.confidence < min_confidence {
            continue;
        }

        if let Some(span) = candidate_span(event.start_secs, event.end_secs)? {
            tracing::debug!(label = %event.label, confidence = event.confidence, %span, "Sound event");
            drops.push(span);
        }
    }

    tracing::debug!(
        events = events.len(),
        matched = drops.len(),
        "Detected sound event spans"
    );
    Ok(drops)
}

/// `None` for zero-length spans, an error for inverted or negative ones.
fn candidate_span(start: f64, end: f64) -> EngineResult<Option<TimeSegment>> {
    if start == end {
        return Ok(None);
    }
    TimeSegment::new(start, end)
        .map(Some)
        .map_err(EngineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, from: &str, to: &str) -> TranscriptWord {
        TranscriptWord::new(text, from, to)
    }

    fn fillers(words: &[&str]) -> FillerSet {
        FillerSet::new(words.iter().copied()).unwrap()
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label(" Um,"), "um");
        assert_eq!(normalize_label("You know"), "youknow");
        assert_eq!(normalize_label(" ... "), "");
        assert_eq!(normalize_label("Ähm!"), "ähm");
    }

    #[test]
    fn test_detects_fillers_case_insensitively() {
        let words = vec![
            word("Um", "00:00:01,000", "00:00:01,500"),
            word("hello", "00:00:01,500", "00:00:02,000"),
            word("uh", "00:00:02,000", "00:00:02,300"),
        ];
        let drops = detect_filler_spans(&words, &fillers(&["um", "uh"])).unwrap();
        let bounds: Vec<_> = drops.iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(bounds, vec![(1.0, 1.5), (2.0, 2.3)]);
    }

    #[test]
    fn test_so_is_exempt_at_sentence_start() {
        let words = vec![
            word(" So", "00:00:00,000", "00:00:00,300"),
            word(" we", "00:00:00,300", "00:00:00,500"),
            word(" so", "00:00:00,500", "00:00:00,800"),
            word(".", "00:00:00,800", "00:00:00,900"),
            word(" So", "00:00:01,000", "00:00:01,200"),
        ];
        let drops = detect_filler_spans(&words, &fillers(&["so"])).unwrap();
        let bounds: Vec<_> = drops.iter().map(|s| (s.start(), s.end())).collect();
        // Index 0 and the one after "." are sentence starts
        assert_eq!(bounds, vec![(0.5, 0.8)]);
    }

    #[test]
    fn test_malformed_timestamp_aborts_even_for_non_fillers() {
        let words = vec![
            word("um", "00:00:01,000", "00:00:01,500"),
            word("hello", "00:00:01.500", "00:00:02,000"),
        ];
        let err = detect_filler_spans(&words, &fillers(&["um"])).unwrap_err();
        assert_eq!(
            err,
            EngineError::MalformedTimestamp {
                value: "00:00:01.500".to_string()
            }
        );
    }

    #[test]
    fn test_zero_length_filler_is_skipped() {
        let words = vec![word("uh", "00:00:03,000", "00:00:03,000")];
        assert!(detect_filler_spans(&words, &fillers(&["uh"]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_inverted_filler_is_an_error() {
        let words = vec![word("uh", "00:00:04,000", "00:00:03,000")];
        assert!(matches!(
            detect_filler_spans(&words, &fillers(&["uh"])),
            Err(EngineError::Segment(_))
        ));
    }

    #[test]
    fn test_sound_events_match_keywords_and_confidence() {
        let events = vec![
            SoundEvent::new("Speech", 0.0, 0.96, 0.9),
            SoundEvent::new("Cough", 0.48, 1.44, 0.8),
            SoundEvent::new("Throat clearing", 0.96, 1.92, 0.2),
            SoundEvent::new("Cough", 1.44, 2.4, 0.6),
        ];
        let labels = vec!["cough".to_string(), "throat".to_string()];

        let all = detect_sound_spans(&events, &labels, 0.0).unwrap();
        assert_eq!(all.len(), 3);

        let confident = detect_sound_spans(&events, &labels, 0.5).unwrap();
        let bounds: Vec<_> = confident.iter().map(|s| (s.start(), s.end())).collect();
        assert_eq!(bounds, vec![(0.48, 1.44), (1.44, 2.4)]);
    }
}
