//! Media probing with ffprobe.

use std::ffi::OsString;
use std::path::Path;

use quietcut_common::error::{QuietcutError, QuietcutResult};
use quietcut_common::tools::run_tool;
use serde::{Deserialize, Serialize};

/// What the cut pipeline needs to know about a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub has_audio: bool,
    pub has_video: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe prints numbers as strings
    duration: Option<String>,
}

impl MediaInfo {
    /// Parse `ffprobe -of json -show_format -show_streams` output.
    pub fn from_ffprobe_json(json: &str) -> QuietcutResult<Self> {
        let probe: ProbeOutput = serde_json::from_str(json)?;

        let duration_secs = probe
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| QuietcutError::probe("media reports no usable duration"))?;

        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"));
        let has_audio = probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        Ok(Self {
            duration_secs,
            has_audio,
            has_video: video.is_some(),
            width: video.and_then(|v| v.width).filter(|w| *w > 0),
            height: video.and_then(|v| v.height).filter(|h| *h > 0),
        })
    }
}

/// Probe `path` with ffprobe.
pub fn probe_media(path: &Path) -> QuietcutResult<MediaInfo> {
    QuietcutError::require_file(path)?;

    let mut args: Vec<OsString> = [
        "-v",
        "error",
        "-show_entries",
        "format=duration:stream=codec_type,width,height",
        "-of",
        "json",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(path.into());
    let output = run_tool("ffprobe", args, QuietcutError::probe)?;

    let info = MediaInfo::from_ffprobe_json(&String::from_utf8_lossy(&output.stdout))?;
    tracing::info!(
        path = %path.display(),
        duration_secs = info.duration_secs,
        has_audio = info.has_audio,
        width = ?info.width,
        height = ?info.height,
        "Probed media"
    );
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_video_with_audio() {
        let json = r#"{
            "programs": [],
            "streams": [
                {"codec_type": "video", "width": 1920, "height": 1080},
                {"codec_type": "audio"}
            ],
            "format": {"duration": "12.345000"}
        }"#;
        let info = MediaInfo::from_ffprobe_json(json).unwrap();
        assert!((info.duration_secs - 12.345).abs() < 1e-9);
        assert!(info.has_audio);
        assert!(info.has_video);
        assert_eq!(info.width, Some(1920));
        assert_eq!(info.height, Some(1080));
    }

    #[test]
    fn test_silent_video_has_no_audio() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 360}], "format": {"duration": "3.0"}}"#;
        let info = MediaInfo::from_ffprobe_json(json).unwrap();
        assert!(!info.has_audio);
    }

    #[test]
    fn test_missing_duration_is_an_error() {
        let json = r#"{"streams": [], "format": {}}"#;
        assert!(matches!(
            MediaInfo::from_ffprobe_json(json),
            Err(QuietcutError::Probe { .. })
        ));
        assert!(MediaInfo::from_ffprobe_json(r#"{"format": {"duration": "N/A"}}"#).is_err());
    }
}
