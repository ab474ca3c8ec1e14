//! Transcript timestamp parsing.
//!
//! Transcribers emit `HH:MM:SS,mmm` (SRT style). Anything else means the
//! upstream format changed, so it is rejected rather than guessed at.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EngineError, EngineResult};

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):([0-5]\d):([0-5]\d),(\d{3})$").expect("valid timestamp regex")
});

/// Parse `HH:MM:SS,mmm` into seconds.
///
/// ```
/// use quietcut_segment_engine::timestamp::parse_timestamp;
/// assert!((parse_timestamp("00:01:02,480").unwrap() - 62.48).abs() < 1e-9);
/// ```
pub fn parse_timestamp(value: &str) -> EngineResult<f64> {
    let malformed = || EngineError::MalformedTimestamp {
        value: value.to_string(),
    };

    let caps = TIMESTAMP_RE.captures(value).ok_or_else(malformed)?;
    let field = |i: usize| -> EngineResult<u64> {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(malformed)
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;

    let whole_secs = hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .ok_or_else(malformed)?;

    Ok(whole_secs as f64 + millis as f64 / 1000.0)
}

/// Format seconds back into `HH:MM:SS,mmm`.
pub fn format_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}
