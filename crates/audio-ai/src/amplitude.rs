//! PCM amplitude sampling.
//!
//! The audio track is decoded once to mono 32-bit float PCM and each chunk
//! request slices that buffer, instead of re-decoding per chunk.

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::Path;

use quietcut_common::error::{QuietcutError, QuietcutResult};
use quietcut_common::tools::run_tool;
use quietcut_segment_engine::AmplitudeSampler;
use quietcut_timeline_model::TimeSegment;

/// Sample rate used for amplitude analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 16_000;

/// Mono PCM buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    /// Decode the first audio stream of `path` through ffmpeg.
    pub fn decode(path: &Path, sample_rate: u32) -> QuietcutResult<Self> {
        QuietcutError::require_file(path)?;
        tracing::info!(path = %path.display(), sample_rate, "Decoding audio track");

        let rate = sample_rate.to_string();
        let mut args: Vec<OsString> = ["-nostdin", "-v", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(path.into());
        args.extend(
            ["-vn", "-ac", "1", "-ar", rate.as_str(), "-f", "f32le", "pipe:1"].map(OsString::from),
        );
        let output = run_tool("ffmpeg", args, QuietcutError::audio)?;

        let audio = Self::from_f32le_bytes(&output.stdout, sample_rate)?;
        tracing::debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            "Audio decoded"
        );
        Ok(audio)
    }

    /// Interpret raw little-endian `f32` PCM.
    pub fn from_f32le_bytes(bytes: &[u8], sample_rate: u32) -> QuietcutResult<Self> {
        if sample_rate == 0 {
            return Err(QuietcutError::audio("sample rate must be positive"));
        }
        if bytes.len() % 4 != 0 {
            return Err(QuietcutError::audio(format!(
                "PCM stream length {} is not a multiple of 4 bytes",
                bytes.len()
            )));
        }

        let samples = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Samples in `[start, end)`, clipped to the buffer.
    pub fn window(&self, window: &TimeSegment) -> &[f32] {
        let rate = f64::from(self.sample_rate);
        let len = self.samples.len();
        let from = ((window.start() * rate).floor() as usize).min(len);
        let to = ((window.end() * rate).ceil() as usize).clamp(from, len);
        &self.samples[from..to]
    }
}

/// [`AmplitudeSampler`] over a decoded track, or over nothing when the
/// media has no audio stream.
#[derive(Debug, Clone)]
pub struct PcmSampler {
    audio: Option<DecodedAudio>,
}

impl PcmSampler {
    pub fn new(audio: DecodedAudio) -> Self {
        Self { audio: Some(audio) }
    }

    /// Sampler for media without an audio stream; every chunk reports no audio.
    pub fn without_audio() -> Self {
        Self { audio: None }
    }

    /// Decode `path` when `has_audio`, otherwise return a silent sampler.
    pub fn from_media(path: &Path, has_audio: bool) -> QuietcutResult<Self> {
        if !has_audio {
            tracing::warn!(path = %path.display(), "Media has no audio stream; nothing will be kept");
            return Ok(Self::without_audio());
        }
        DecodedAudio::decode(path, ANALYSIS_SAMPLE_RATE).map(Self::new)
    }

    pub fn audio(&self) -> Option<&DecodedAudio> {
        self.audio.as_ref()
    }
}

impl AmplitudeSampler for PcmSampler {
    fn sample(&self, window: &TimeSegment) -> Option<Cow<'_, [f32]>> {
        self.audio
            .as_ref()
            .map(|audio| Cow::Borrowed(audio.window(window)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> TimeSegment {
        TimeSegment::new(start, end).unwrap()
    }

    #[test]
    fn test_from_f32le_bytes() {
        let bytes: Vec<u8> = [0.5_f32, -0.25, 1.0]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let audio = DecodedAudio::from_f32le_bytes(&bytes, 3).unwrap();
        assert_eq!(audio.samples, vec![0.5, -0.25, 1.0]);
        assert!((audio.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_truncated_stream() {
        assert!(DecodedAudio::from_f32le_bytes(&[0, 0, 0], 16_000).is_err());
        assert!(DecodedAudio::from_f32le_bytes(&[], 0).is_err());
    }

    #[test]
    fn test_window_slices_and_clips() {
        let audio = DecodedAudio {
            sample_rate: 4,
            samples: (0..8).map(|i| i as f32).collect(),
        };
        assert_eq!(audio.window(&seg(0.0, 0.5)), &[0.0, 1.0]);
        assert_eq!(audio.window(&seg(1.5, 3.0)), &[6.0, 7.0]);
        assert!(audio.window(&seg(2.5, 3.0)).is_empty());
    }

    #[test]
    fn test_sampler_without_audio_reports_none() {
        let sampler = PcmSampler::without_audio();
        assert!(sampler.sample(&seg(0.0, 1.0)).is_none());

        let sampler = PcmSampler::new(DecodedAudio {
            sample_rate: 2,
            samples: vec![0.1, 0.9],
        });
        let samples = sampler.sample(&seg(0.5, 1.0)).unwrap();
        assert_eq!(samples.as_ref(), &[0.9]);
    }
}
