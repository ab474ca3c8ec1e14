//! Remove coughs and throat clearing.

use std::path::PathBuf;

use quietcut_audio_ai::SoundFrames;
use quietcut_common::config::AppConfig;
use quietcut_render_engine::probe_media;
use quietcut_segment_engine::{CutPlanner, EngineConfig};

use super::cut::{self, CutArgs};

pub async fn run(
    input: PathBuf,
    frames: PathBuf,
    labels: Option<Vec<String>>,
    min_confidence: Option<f64>,
    cut: CutArgs,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    println!("Removing sound events from: {}", input.display());

    if let Some(labels) = labels {
        config.edit.sound_labels = labels;
    }
    if let Some(confidence) = min_confidence {
        config.edit.min_sound_confidence = confidence;
    }
    cut.apply(&mut config.edit);

    let media = probe_media(&input)?;
    let planner = CutPlanner::new(EngineConfig::new(&config.edit, media.duration_secs)?);

    let events = SoundFrames::load(&frames)?.to_events(
        config.edit.sound_frame_hop_secs,
        config.edit.sound_frame_window_secs,
    )?;
    println!("  Frames analyzed: {}", events.len());

    let planned = planner.plan_sounds(&events);

    if let Ok(plan) = &planned {
        let found = plan.drops.as_ref().map_or(0, |d| d.len());
        if found == 0 {
            println!("No cough or throat clearing events detected. Exiting.");
            return Ok(());
        }
        println!("  Found {found} event span(s) to cut.");
    }

    cut::finish(input, &media, planned, &cut, &config).await
}
