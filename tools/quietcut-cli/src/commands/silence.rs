//! Remove silent stretches.

use std::path::PathBuf;

use quietcut_audio_ai::PcmSampler;
use quietcut_common::config::AppConfig;
use quietcut_render_engine::probe_media;
use quietcut_segment_engine::{CutPlanner, EngineConfig};

use super::cut::{self, CutArgs};

pub async fn run(
    input: PathBuf,
    chunk_secs: Option<f64>,
    threshold: Option<f64>,
    cut: CutArgs,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    println!("Removing silence from: {}", input.display());

    if let Some(secs) = chunk_secs {
        config.edit.chunk_duration_secs = secs;
    }
    if let Some(threshold) = threshold {
        config.edit.silence_threshold = threshold;
    }
    cut.apply(&mut config.edit);

    let media = probe_media(&input)?;
    let planner = CutPlanner::new(EngineConfig::new(&config.edit, media.duration_secs)?);

    println!(
        "  Chunk: {:.2}s  Threshold: {}",
        config.edit.chunk_duration_secs, config.edit.silence_threshold
    );
    let sampler = PcmSampler::from_media(&input, media.has_audio)?;
    let planned = planner.plan_silence(&sampler);

    cut::finish(input, &media, planned, &cut, &config).await
}
