//! Sound-event frames from an audio classifier.
//!
//! Classifiers in the YAMNet family score every class once per hop
//! (0.48 s) over a 0.96 s window. QuietCut does not run the model; it reads
//! the score matrix as JSON and reduces each frame to its top class:
//!
//! ```json
//! {"class_names": ["Speech", "Cough"], "scores": [[2.1, -3.0], [-1.2, 4.4]]}
//! ```
//!
//! Scores are logits; the confidence of a frame is the sigmoid of its top
//! score.

use std::path::Path;

use quietcut_common::error::{QuietcutError, QuietcutResult};
use quietcut_timeline_model::SoundEvent;
use serde::{Deserialize, Serialize};

/// Per-frame class scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundFrames {
    pub class_names: Vec<String>,
    /// One row per frame, one column per class.
    pub scores: Vec<Vec<f32>>,
    /// Overrides the configured hop when present.
    #[serde(default)]
    pub hop_secs: Option<f64>,
    /// Overrides the configured window when present.
    #[serde(default)]
    pub window_secs: Option<f64>,
}

impl SoundFrames {
    pub fn load(path: &Path) -> QuietcutResult<Self> {
        QuietcutError::require_file(path)?;
        let content = std::fs::read_to_string(path)?;
        let frames: Self = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            frames = frames.scores.len(),
            classes = frames.class_names.len(),
            "Loaded sound-event frames"
        );
        Ok(frames)
    }

    /// Top-class event for every frame, in frame order.
    ///
    /// Frame `i` spans `[i * hop, i * hop + window)`. The file's own hop and
    /// window win over the arguments.
    pub fn to_events(&self, hop_secs: f64, window_secs: f64) -> QuietcutResult<Vec<SoundEvent>> {
        let hop = self.hop_secs.unwrap_or(hop_secs);
        let window = self.window_secs.unwrap_or(window_secs);
        if !(hop > 0.0) || !(window > 0.0) {
            return Err(QuietcutError::sound_events(format!(
                "frame hop ({hop}) and window ({window}) must be positive"
            )));
        }

        self.scores
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let (class, logit) = row
                    .iter()
                    .copied()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .ok_or_else(|| {
                        QuietcutError::sound_events(format!("frame {index} has no scores"))
                    })?;
                let label = self.class_names.get(class).ok_or_else(|| {
                    QuietcutError::sound_events(format!(
                        "frame {index} scores class {class} but only {} class names are known",
                        self.class_names.len()
                    ))
                })?;

                let start = index as f64 * hop;
                Ok(SoundEvent::new(
                    label.clone(),
                    start,
                    start + window,
                    sigmoid(f64::from(logit)),
                ))
            })
            .collect()
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
