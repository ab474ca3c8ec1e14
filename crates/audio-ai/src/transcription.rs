//! Local transcription using whisper.cpp.
//!
//! Runs speech-to-text locally through the `whisper-cli` binary with one
//! token per segment (`-ml 1`) and JSON output (`-oj`), which yields the
//! word-level records the filler detector consumes.
//!
//! Transcription is slow, so results are cached beside the media file:
//! [`CachedTranscript`] loads the JSON when it exists and only runs the
//! [`Transcriber`] otherwise.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quietcut_common::config::TranscriptionDefaults;
use quietcut_common::error::{QuietcutError, QuietcutResult};
use quietcut_common::tools::{require_tool, run_tool};
use quietcut_timeline_model::TranscriptDocument;
use serde::{Deserialize, Serialize};

/// Whisper model size selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    /// Fastest, least accurate (~39 MB).
    Tiny,
    /// Good balance of speed and accuracy (~142 MB).
    Base,
    /// Better accuracy, slower (~466 MB).
    Small,
    /// High accuracy (~1.5 GB).
    Medium,
    /// Best accuracy, slowest (~2.9 GB).
    Large,
}

impl WhisperModel {
    /// Approximate model file size in bytes.
    pub fn size_bytes(&self) -> u64 {
        match self {
            WhisperModel::Tiny => 39_000_000,
            WhisperModel::Base => 142_000_000,
            WhisperModel::Small => 466_000_000,
            WhisperModel::Medium => 1_500_000_000,
            WhisperModel::Large => 2_900_000_000,
        }
    }

    /// ggml model filename.
    pub fn filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large.bin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
            WhisperModel::Large => "large",
        }
    }
}

impl fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WhisperModel {
    type Err = QuietcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            other => Err(QuietcutError::config(format!(
                "unknown whisper model {other:?} (expected tiny, base, small, medium or large)"
            ))),
        }
    }
}

/// Configuration for transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model to use.
    pub model: WhisperModel,

    /// Directory holding the ggml model files.
    pub models_dir: PathBuf,

    /// Language hint (ISO 639-1 code, e.g., "en").
    pub language: Option<String>,

    /// whisper.cpp executable.
    pub binary: String,

    /// Number of CPU threads for inference.
    pub threads: usize,
}

impl TranscriptionConfig {
    pub fn from_defaults(defaults: &TranscriptionDefaults) -> QuietcutResult<Self> {
        Ok(Self {
            model: defaults.model.parse()?,
            models_dir: defaults.models_dir.clone(),
            language: defaults.language.clone(),
            binary: defaults.binary.clone(),
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        })
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join(self.model.filename())
    }
}

/// Something that can turn a media file into a word-level transcript.
pub trait Transcriber {
    fn transcribe(&self, media_path: &Path) -> QuietcutResult<TranscriptDocument>;
}

/// Cache-or-compute access to a transcript.
pub trait TranscriptSource {
    fn load(&self, media_path: &Path) -> QuietcutResult<TranscriptDocument>;
}

/// Default cache location: `<media>.transcript.json` beside the media.
pub fn default_transcript_path(media_path: &Path) -> PathBuf {
    let mut name = media_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("media"));
    name.push(".transcript.json");
    media_path.with_file_name(name)
}

/// Read a whisper.cpp JSON transcript.
pub fn read_transcript(path: &Path) -> QuietcutResult<TranscriptDocument> {
    QuietcutError::require_file(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok(TranscriptDocument::from_json(&content)?)
}

/// Loads the transcript at `cache_path` when present, otherwise
/// transcribes and stores the result there.
#[derive(Debug, Clone)]
pub struct CachedTranscript<T> {
    transcriber: T,
    cache_path: PathBuf,
}

impl<T: Transcriber> CachedTranscript<T> {
    pub fn new(transcriber: T, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            transcriber,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }
}

impl<T: Transcriber> TranscriptSource for CachedTranscript<T> {
    fn load(&self, media_path: &Path) -> QuietcutResult<TranscriptDocument> {
        if self.cache_path.exists() {
            tracing::info!(
                path = %self.cache_path.display(),
                "Transcript already exists, skipping transcription"
            );
            return read_transcript(&self.cache_path);
        }

        let document = self.transcriber.transcribe(media_path)?;

        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.cache_path, serde_json::to_string_pretty(&document)?)?;
        tracing::info!(
            path = %self.cache_path.display(),
            words = document.words().len(),
            "Transcript saved"
        );
        Ok(document)
    }
}

/// [`Transcriber`] backed by the whisper.cpp CLI.
#[derive(Debug, Clone)]
pub struct WhisperCppTranscriber {
    config: TranscriptionConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    /// Arguments for `whisper-cli`, writing `<output_base>.json`.
    fn whisper_args(&self, wav_path: &Path, output_base: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-m".into(),
            self.config.model_path().into(),
            "-f".into(),
            wav_path.into(),
            "-ml".into(),
            "1".into(),
            "-oj".into(),
            "-of".into(),
            output_base.into(),
            "-t".into(),
            self.config.threads.to_string().into(),
            "-np".into(),
        ];
        if let Some(language) = &self.config.language {
            args.push("-l".into());
            args.push(language.into());
        }
        args
    }
}

impl Transcriber for WhisperCppTranscriber {
    fn transcribe(&self, media_path: &Path) -> QuietcutResult<TranscriptDocument> {
        QuietcutError::require_file(media_path)?;
        require_tool("ffmpeg")?;
        require_tool(&self.config.binary)?;

        let model_path = self.config.model_path();
        if !model_path.exists() {
            return Err(QuietcutError::transcription(format!(
                "whisper model not found at {} (download {} into {})",
                model_path.display(),
                self.config.model.filename(),
                self.config.models_dir.display()
            )));
        }

        tracing::info!(
            path = %media_path.display(),
            model = %self.config.model,
            threads = self.config.threads,
            "Starting transcription"
        );
        let started = std::time::Instant::now();

        let work_base = std::env::temp_dir().join(format!(
            "quietcut-transcribe-{}-{}",
            std::process::id(),
            media_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        let wav_path = work_base.with_extension("wav");
        let json_path = work_base.with_extension("json");

        // whisper.cpp only reads 16 kHz mono WAV
        let mut ffmpeg_args: Vec<OsString> = ["-nostdin", "-y", "-v", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        ffmpeg_args.push(media_path.into());
        ffmpeg_args.extend(
            ["-vn", "-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le"].map(OsString::from),
        );
        ffmpeg_args.push(wav_path.clone().into());
        run_tool("ffmpeg", ffmpeg_args, QuietcutError::transcription)?;

        let result = run_tool(
            &self.config.binary,
            self.whisper_args(&wav_path, &work_base),
            QuietcutError::transcription,
        )
        .and_then(|_| read_transcript(&json_path));

        for path in [&wav_path, &json_path] {
            if let Err(err) = std::fs::remove_file(path) {
                tracing::debug!(error = %err, path = %path.display(), "Failed to remove temp file");
            }
        }

        let document = result?;
        tracing::info!(
            words = document.words().len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Transcription finished"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quietcut_timeline_model::TranscriptWord;
    use std::cell::Cell;

    struct CountingTranscriber {
        calls: Cell<usize>,
    }

    impl Transcriber for CountingTranscriber {
        fn transcribe(&self, _media_path: &Path) -> QuietcutResult<TranscriptDocument> {
            self.calls.set(self.calls.get() + 1);
            Ok(TranscriptDocument {
                transcription: vec![TranscriptWord::new(" um", "00:00:00,100", "00:00:00,400")],
            })
        }
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!("Large".parse::<WhisperModel>().unwrap(), WhisperModel::Large);
        assert_eq!(WhisperModel::Base.filename(), "ggml-base.bin");
        assert!("huge".parse::<WhisperModel>().is_err());
    }

    #[test]
    fn test_default_transcript_path_sits_beside_media() {
        let path = default_transcript_path(Path::new("/videos/talk.mov"));
        assert_eq!(path, PathBuf::from("/videos/talk.mov.transcript.json"));
    }

    #[test]
    fn test_cache_computes_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("talk.mov.transcript.json");
        let source = CachedTranscript::new(
            CountingTranscriber {
                calls: Cell::new(0),
            },
            &cache,
        );

        let first = source.load(Path::new("talk.mov")).unwrap();
        assert!(cache.exists());
        let second = source.load(Path::new("talk.mov")).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.transcriber.calls.get(), 1);
    }

    #[test]
    fn test_existing_cache_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cached.json");
        std::fs::write(
            &cache,
            r#"{"transcription":[{"text":" uh","timestamps":{"from":"00:00:02,000","to":"00:00:02,300"}}]}"#,
        )
        .unwrap();

        let source = CachedTranscript::new(
            CountingTranscriber {
                calls: Cell::new(0),
            },
            &cache,
        );
        let doc = source.load(Path::new("unused.mov")).unwrap();
        assert_eq!(doc.words()[0].text, " uh");
        assert_eq!(source.transcriber.calls.get(), 0);
    }

    #[test]
    fn test_whisper_args_request_word_level_json() {
        let transcriber = WhisperCppTranscriber::new(TranscriptionConfig {
            model: WhisperModel::Small,
            models_dir: PathBuf::from("/models"),
            language: Some("en".to_string()),
            binary: "whisper-cli".to_string(),
            threads: 2,
        });
        let args: Vec<String> = transcriber
            .whisper_args(Path::new("/tmp/a.wav"), Path::new("/tmp/a"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(&args[..2], &["-m", "/models/ggml-small.bin"]);
        assert!(args.windows(2).any(|w| w[0] == "-ml" && w[1] == "1"));
        assert!(args.contains(&"-oj".to_string()));
        assert_eq!(&args[args.len() - 2..], &["-l", "en"]);
    }
}
