//! Validated engine configuration.
//!
//! Built once from [`EditDefaults`] (the JSON config file merged with CLI
//! overrides) plus the media duration. Every field is checked here so the
//! classifier, merger and assembler can trust their inputs.

use std::collections::BTreeSet;

use quietcut_common::config::EditDefaults;
use quietcut_timeline_model::AssemblyMode;

use crate::classifier::normalize_label;
use crate::error::{EngineError, EngineResult};

/// Filler words, stored in normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerSet {
    words: BTreeSet<String>,
}

impl FillerSet {
    /// Normalize each entry; entries that normalize to nothing are dropped.
    pub fn new<I, S>(words: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| normalize_label(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(EngineError::invalid_config(
                "fillers",
                "at least one non-empty filler word is required",
            ));
        }
        Ok(Self { words })
    }

    /// Membership test for an already-normalized label.
    pub fn contains(&self, normalized: &str) -> bool {
        self.words.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Engine configuration with every invariant checked at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    chunk_duration_secs: f64,
    silence_threshold: f64,
    merge: bool,
    merge_gap_secs: f64,
    assembly: AssemblyMode,
    fillers: FillerSet,
    sound_labels: Vec<String>,
    min_sound_confidence: f64,
    total_duration_secs: f64,
}

impl EngineConfig {
    /// Validate `defaults` against a media duration.
    pub fn new(defaults: &EditDefaults, total_duration_secs: f64) -> EngineResult<Self> {
        require_positive("total_duration", total_duration_secs)?;
        require_positive("chunk_duration", defaults.chunk_duration_secs)?;
        require_non_negative("silence_threshold", defaults.silence_threshold)?;
        require_non_negative("merge_gap", defaults.merge_gap_secs)?;
        require_non_negative("crossfade_overlap", defaults.crossfade_secs)?;

        let assembly = if defaults.crossfade {
            require_positive("crossfade_overlap", defaults.crossfade_secs)?;
            AssemblyMode::Crossfade {
                overlap_secs: defaults.crossfade_secs,
            }
        } else {
            AssemblyMode::Concatenate
        };

        if !(0.0..=1.0).contains(&defaults.min_sound_confidence) {
            return Err(EngineError::invalid_config(
                "min_sound_confidence",
                format!("{} is outside [0, 1]", defaults.min_sound_confidence),
            ));
        }

        let fillers = FillerSet::new(&defaults.fillers)?;
        let sound_labels = defaults
            .sound_labels
            .iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        Ok(Self {
            chunk_duration_secs: defaults.chunk_duration_secs,
            silence_threshold: defaults.silence_threshold,
            merge: defaults.merge,
            merge_gap_secs: defaults.merge_gap_secs,
            assembly,
            fillers,
            sound_labels,
            min_sound_confidence: defaults.min_sound_confidence,
            total_duration_secs,
        })
    }

    pub fn chunk_duration_secs(&self) -> f64 {
        self.chunk_duration_secs
    }

    pub fn silence_threshold(&self) -> f64 {
        self.silence_threshold
    }

    /// Whether keep-spans are merged before assembly.
    pub fn merge(&self) -> bool {
        self.merge
    }

    pub fn merge_gap_secs(&self) -> f64 {
        self.merge_gap_secs
    }

    pub fn assembly(&self) -> AssemblyMode {
        self.assembly
    }

    pub fn fillers(&self) -> &FillerSet {
        &self.fillers
    }

    /// Lowercased keywords matched against sound-event labels.
    pub fn sound_labels(&self) -> &[String] {
        &self.sound_labels
    }

    pub fn min_sound_confidence(&self) -> f64 {
        self.min_sound_confidence
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_secs
    }
}

// Written as negated comparisons so NaN is rejected too.
fn require_positive(field: &'static str, value: f64) -> EngineResult<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(EngineError::invalid_config(
            field,
            format!("{value} must be a finite number > 0"),
        ));
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> EngineResult<()> {
    if !(value >= 0.0) || !value.is_finite() {
        return Err(EngineError::invalid_config(
            field,
            format!("{value} must be a finite number >= 0"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::new(&EditDefaults::default(), 60.0).unwrap();
        assert_eq!(
            config.assembly(),
            AssemblyMode::Crossfade { overlap_secs: 0.3 }
        );
        assert!(config.fillers().contains("um"));
        assert!(!config.fillers().contains("youknow"));
        assert_eq!(config.sound_labels(), &["cough", "throat"]);
    }

    #[test]
    fn test_rejects_non_positive_chunk() {
        let defaults = EditDefaults {
            chunk_duration_secs: 0.0,
            ..Default::default()
        };
        let err = EngineConfig::new(&defaults, 10.0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfiguration {
                field: "chunk_duration",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_thresholds_and_nan() {
        let negative_gap = EditDefaults {
            merge_gap_secs: -0.1,
            ..Default::default()
        };
        assert!(EngineConfig::new(&negative_gap, 10.0).is_err());

        let nan_threshold = EditDefaults {
            silence_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(EngineConfig::new(&nan_threshold, 10.0).is_err());

        assert!(EngineConfig::new(&EditDefaults::default(), 0.0).is_err());
    }

    #[test]
    fn test_zero_overlap_only_rejected_when_crossfading() {
        let crossfade = EditDefaults {
            crossfade: true,
            crossfade_secs: 0.0,
            ..Default::default()
        };
        assert!(EngineConfig::new(&crossfade, 10.0).is_err());

        let hard_cuts = EditDefaults {
            crossfade: false,
            crossfade_secs: 0.0,
            ..Default::default()
        };
        let config = EngineConfig::new(&hard_cuts, 10.0).unwrap();
        assert_eq!(config.assembly(), AssemblyMode::Concatenate);
    }

    #[test]
    fn test_filler_set_must_not_be_empty() {
        let defaults = EditDefaults {
            fillers: vec!["  ".to_string(), "...".to_string()],
            ..Default::default()
        };
        let err = EngineConfig::new(&defaults, 10.0).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfiguration {
                field: "fillers",
                ..
            }
        ));
    }
}
