//! Check external tool availability.

use quietcut_audio_ai::TranscriptionConfig;
use quietcut_common::config::AppConfig;
use quietcut_common::tools::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("QuietCut System Check");
    println!("{}", "=".repeat(50));

    let mut required_ok = true;
    for tool in ["ffmpeg", "ffprobe"] {
        if command_exists(tool) {
            println!("[OK] {tool}");
        } else {
            println!("[MISSING] {tool} (required for every command)");
            required_ok = false;
        }
    }

    let whisper = &config.transcription.binary;
    if command_exists(whisper) {
        println!("[OK] {whisper}");
    } else {
        println!("[WARN] {whisper} not found (needed by `fillers` without a transcript)");
    }

    match TranscriptionConfig::from_defaults(&config.transcription) {
        Ok(transcription) => {
            let model_path = transcription.model_path();
            if model_path.exists() {
                println!("[OK] Whisper model: {}", model_path.display());
            } else {
                println!(
                    "[WARN] Whisper model missing: {} (~{} MB)",
                    model_path.display(),
                    transcription.model.size_bytes() / 1_000_000
                );
            }
        }
        Err(e) => println!("[WARN] {e}"),
    }

    println!();
    if required_ok {
        println!("All required tools are available. QuietCut is ready.");
    } else {
        println!("Some required tools are missing. Install ffmpeg and retry.");
    }

    Ok(())
}
