//! Error types shared across QuietCut crates.

use std::path::PathBuf;

/// Top-level error type for QuietCut I/O-facing operations.
///
/// The segment engine has its own pure error type; this one covers
/// everything that touches the filesystem or an external tool.
#[derive(Debug, thiserror::Error)]
pub enum QuietcutError {
    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Sound event error: {message}")]
    SoundEvents { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Required tool not found in PATH: {tool}")]
    ToolMissing { tool: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using QuietcutError.
pub type QuietcutResult<T> = Result<T, QuietcutError>;

impl QuietcutError {
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription {
            message: msg.into(),
        }
    }

    pub fn sound_events(msg: impl Into<String>) -> Self {
        Self::SoundEvents {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn tool_missing(tool: impl Into<String>) -> Self {
        Self::ToolMissing { tool: tool.into() }
    }

    /// Ensure a file exists before handing it to an external tool.
    pub fn require_file(path: &std::path::Path) -> QuietcutResult<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_file_reports_missing_path() {
        let missing = std::path::Path::new("/definitely/not/here.mov");
        match QuietcutError::require_file(missing) {
            Err(QuietcutError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_message() {
        let err = QuietcutError::tool_missing("ffmpeg");
        assert_eq!(err.to_string(), "Required tool not found in PATH: ffmpeg");
    }
}
