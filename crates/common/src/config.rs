//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default cut-detection and assembly settings.
    pub edit: EditDefaults,

    /// Speech-to-text settings used by the filler remover.
    pub transcription: TranscriptionDefaults,

    /// Encoder settings for the final export.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for detecting and stitching spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditDefaults {
    /// Length of each loudness sampling chunk (seconds).
    pub chunk_duration_secs: f64,

    /// Linear amplitude a chunk must exceed to count as loud.
    pub silence_threshold: f64,

    /// Whether to merge close keep-spans before assembly.
    pub merge: bool,

    /// Largest gap (seconds) that still merges two spans.
    pub merge_gap_secs: f64,

    /// Whether to crossfade between kept spans instead of hard cuts.
    pub crossfade: bool,

    /// Crossfade overlap (seconds).
    pub crossfade_secs: f64,

    /// Words removed by the filler remover.
    ///
    /// Each entry is matched against one transcript token, so multi-word
    /// phrases never match a word-level transcript.
    pub fillers: Vec<String>,

    /// Keywords matched against sound-event labels.
    pub sound_labels: Vec<String>,

    /// Minimum classifier confidence for a sound event to be cut.
    pub min_sound_confidence: f64,

    /// Hop between sound classifier frames (seconds).
    pub sound_frame_hop_secs: f64,

    /// Analysis window of a sound classifier frame (seconds).
    pub sound_frame_window_secs: f64,
}

/// Transcription defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionDefaults {
    /// Whisper model size ("tiny", "base", "small", "medium", "large").
    pub model: String,

    /// Directory holding ggml model files.
    pub models_dir: PathBuf,

    /// Language hint (ISO 639-1).
    pub language: Option<String>,

    /// whisper.cpp executable name or path.
    pub binary: String,
}

/// Encoder defaults for the export driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// ffmpeg video encoder.
    pub video_codec: String,

    /// Encoder preset.
    pub preset: String,

    /// Constant rate factor.
    pub crf: u32,

    /// Target video bitrate (ffmpeg syntax, e.g. "2500k").
    pub video_bitrate: String,

    /// ffmpeg audio encoder.
    pub audio_codec: String,

    /// Encoder threads; `None` uses every available core.
    pub threads: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "quietcut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditDefaults {
    fn default() -> Self {
        Self {
            chunk_duration_secs: 0.5,
            silence_threshold: 0.03,
            merge: true,
            merge_gap_secs: 0.05,
            crossfade: true,
            crossfade_secs: 0.3,
            fillers: ["um", "uh", "ah", "like", "so"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sound_labels: vec!["cough".to_string(), "throat".to_string()],
            min_sound_confidence: 0.0,
            sound_frame_hop_secs: 0.48,
            sound_frame_window_secs: 0.96,
        }
    }
}

impl Default for TranscriptionDefaults {
    fn default() -> Self {
        Self {
            model: "large".to_string(),
            models_dir: default_data_dir().join("models"),
            language: Some("en".to_string()),
            binary: "whisper-cli".to_string(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "slow".to_string(),
            crf: 18,
            video_bitrate: "2500k".to_string(),
            audio_codec: "aac".to_string(),
            threads: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("quietcut").join("config.json")
}

/// Default data directory (models, caches).
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("quietcut")
}
