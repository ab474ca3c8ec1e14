//! Shared tail of every cut command: report, plan-only output, export.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use quietcut_common::config::{AppConfig, EditDefaults};
use quietcut_render_engine::{export_plan, ExportJob, ExportProgress, MediaInfo, MediaStreams};
use quietcut_segment_engine::{CutPlan, EngineError, EngineResult};

/// Merge, fade, and output flags shared by all cut commands.
#[derive(Args, Debug, Clone, Default)]
pub struct CutArgs {
    /// Output file (default: <INPUT stem>_cleaned.mov beside the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the cut plan as JSON and skip encoding
    #[arg(long)]
    pub plan_only: bool,

    /// Do not merge close keep-spans
    #[arg(long)]
    pub no_merge: bool,

    /// Largest gap between keep-spans that still merges them (seconds)
    #[arg(long)]
    pub merge_gap: Option<f64>,

    /// Hard cuts instead of crossfades
    #[arg(long)]
    pub no_fade: bool,

    /// Crossfade duration (seconds)
    #[arg(long)]
    pub fade_secs: Option<f64>,
}

impl CutArgs {
    /// Layer these flags over the configured edit defaults.
    pub fn apply(&self, edit: &mut EditDefaults) {
        if self.no_merge {
            edit.merge = false;
        }
        if let Some(gap) = self.merge_gap {
            edit.merge_gap_secs = gap;
        }
        if self.no_fade {
            edit.crossfade = false;
        }
        if let Some(secs) = self.fade_secs {
            edit.crossfade_secs = secs;
        }
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(input))
    }
}

/// `<dir>/<stem>_cleaned.mov`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push("_cleaned.mov");
    input.with_file_name(name)
}

/// Report the plan, then print it or export it.
///
/// An empty keep-set is "nothing to export", not a failure.
pub async fn finish(
    input: PathBuf,
    media: &MediaInfo,
    planned: EngineResult<CutPlan>,
    cut: &CutArgs,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let plan = match planned {
        Ok(plan) => plan,
        Err(EngineError::EmptySegmentSet) => {
            println!("Nothing left to export: every part of the input was cut. Exiting.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if cut.plan_only {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let coverage = &plan.coverage;
    println!("  Keeping {} segment(s)", coverage.keep_count);
    println!(
        "  Kept {:.2}s of {:.2}s ({:.1}% removed)",
        coverage.kept_secs,
        coverage.total_secs,
        coverage.removed_ratio() * 100.0
    );
    println!("  Output length: {:.2}s", coverage.output_secs);

    let output_path = cut.output_path(&input);
    println!("  Output: {}", output_path.display());

    let job = ExportJob {
        source_path: input,
        output_path,
        plan: plan.plan,
        source_duration_secs: media.duration_secs,
        streams: MediaStreams {
            video: media.has_video,
            audio: media.has_audio,
        },
        settings: config.export.clone(),
    };

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:.1}% ({:.1}/{:.1}s, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.out_time_secs,
            p.expected_duration_secs,
            p.eta_secs,
        );
        let _ = std::io::stdout().flush();
    });

    let summary = export_plan(job, Some(progress_cb)).await?;
    println!("\nExport complete: {}", summary.output_path.display());
    println!("  Cut report: {}", summary.report_path.display());
    println!("  Encoded in {:.1}s", summary.elapsed_secs);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/talk.mov")),
            PathBuf::from("/videos/talk_cleaned.mov")
        );
        assert_eq!(
            default_output_path(Path::new("clip.mp4")),
            PathBuf::from("clip_cleaned.mov")
        );
    }

    #[test]
    fn test_flags_override_edit_defaults() {
        let args = CutArgs {
            no_merge: true,
            merge_gap: Some(0.2),
            no_fade: true,
            fade_secs: Some(0.1),
            ..Default::default()
        };
        let mut edit = EditDefaults::default();
        args.apply(&mut edit);

        assert!(!edit.merge);
        assert_eq!(edit.merge_gap_secs, 0.2);
        assert!(!edit.crossfade);
        assert_eq!(edit.crossfade_secs, 0.1);
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let mut edit = EditDefaults::default();
        CutArgs::default().apply(&mut edit);
        assert!(edit.merge);
        assert!(edit.crossfade);
    }
}
