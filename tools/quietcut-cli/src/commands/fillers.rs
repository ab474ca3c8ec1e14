//! Remove filler words.

use std::path::PathBuf;

use quietcut_audio_ai::{
    default_transcript_path, CachedTranscript, TranscriptSource, TranscriptionConfig,
    WhisperCppTranscriber,
};
use quietcut_common::config::AppConfig;
use quietcut_render_engine::probe_media;
use quietcut_segment_engine::{CutPlanner, EngineConfig};

use super::cut::{self, CutArgs};

pub async fn run(
    input: PathBuf,
    transcript: Option<PathBuf>,
    fillers: Option<Vec<String>>,
    model: Option<String>,
    cut: CutArgs,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    println!("Removing filler words from: {}", input.display());

    if let Some(fillers) = fillers {
        config.edit.fillers = fillers;
    }
    if let Some(model) = model {
        config.transcription.model = model;
    }
    cut.apply(&mut config.edit);

    let media = probe_media(&input)?;
    // Validate before the expensive transcription step
    let planner = CutPlanner::new(EngineConfig::new(&config.edit, media.duration_secs)?);

    let transcript_path = transcript.unwrap_or_else(|| default_transcript_path(&input));
    let transcriber = WhisperCppTranscriber::new(TranscriptionConfig::from_defaults(
        &config.transcription,
    )?);
    let source = CachedTranscript::new(transcriber, transcript_path);
    println!("  Transcript: {}", source.cache_path().display());

    let document = source.load(&input)?;
    let planned = planner.plan_fillers(document.words());

    if let Ok(plan) = &planned {
        let found = plan.drops.as_ref().map_or(0, |d| d.len());
        println!("\nDetected {found} filler segment(s).");
        if found == 0 {
            println!("No filler words found. Exiting.");
            return Ok(());
        }
    }

    cut::finish(input, &media, planned, &cut, &config).await
}
