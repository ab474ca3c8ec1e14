//! QuietCut CLI: remove silence, filler words, and coughs from recordings.
//!
//! Usage:
//!   quietcut silence <INPUT>                Keep only the loud parts
//!   quietcut fillers <INPUT>                Cut filler words from a transcript
//!   quietcut sounds <INPUT> --frames <F>    Cut coughs and throat clearing
//!   quietcut check                          Check external tools
//!   quietcut config [--init]                Show or write the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use quietcut_common::config::AppConfig;

mod commands;

use commands::cut::CutArgs;

#[derive(Parser)]
#[command(
    name = "quietcut",
    about = "Cut silence, filler words, and coughs out of recorded video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove silent stretches by chunked loudness
    Silence {
        /// Input video
        input: PathBuf,

        /// Chunk duration for loudness sampling (seconds)
        #[arg(long)]
        chunk_secs: Option<f64>,

        /// Peak amplitude a chunk must exceed to be kept
        #[arg(long)]
        threshold: Option<f64>,

        #[command(flatten)]
        cut: CutArgs,
    },

    /// Remove filler words using a word-level transcript
    Fillers {
        /// Input video
        input: PathBuf,

        /// Transcript JSON (default: <INPUT>.transcript.json, created if missing)
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Comma-separated filler words
        #[arg(long, value_delimiter = ',')]
        fillers: Option<Vec<String>>,

        /// Whisper model: tiny|base|small|medium|large
        #[arg(long)]
        model: Option<String>,

        #[command(flatten)]
        cut: CutArgs,
    },

    /// Remove coughs and throat clearing using sound-event frames
    Sounds {
        /// Input video
        input: PathBuf,

        /// Per-frame classifier scores (JSON)
        #[arg(long)]
        frames: PathBuf,

        /// Comma-separated label keywords
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,

        /// Minimum confidence for an event to be cut [0.0, 1.0]
        #[arg(long)]
        min_confidence: Option<f64>,

        #[command(flatten)]
        cut: CutArgs,
    },

    /// Check that ffmpeg, ffprobe and whisper.cpp are available
    Check,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    quietcut_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Silence {
            input,
            chunk_secs,
            threshold,
            cut,
        } => commands::silence::run(input, chunk_secs, threshold, cut, config).await,
        Commands::Fillers {
            input,
            transcript,
            fillers,
            model,
            cut,
        } => commands::fillers::run(input, transcript, fillers, model, cut, config).await,
        Commands::Sounds {
            input,
            frames,
            labels,
            min_confidence,
            cut,
        } => commands::sounds::run(input, frames, labels, min_confidence, cut, config).await,
        Commands::Check => commands::check::run(&config),
        Commands::Config { init, force } => {
            commands::config::run(&config, cli.config.as_deref(), init, force)
        }
    }
}
