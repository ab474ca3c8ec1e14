//! Export of a placement plan through ffmpeg.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use quietcut_common::config::ExportDefaults;
use quietcut_common::error::{QuietcutError, QuietcutResult};
use quietcut_common::tools::command_exists;
use quietcut_timeline_model::{AssemblyMode, Placement, PlacementPlan};
use serde::Serialize;

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Media the plan was computed for.
    pub source_path: PathBuf,

    /// Output file path.
    pub output_path: PathBuf,

    /// Placements to render, in output order.
    pub plan: PlacementPlan,

    /// Full length of the source, for the cut report.
    pub source_duration_secs: f64,

    /// Streams present in the source.
    pub streams: MediaStreams,

    /// Encoder settings.
    pub settings: ExportDefaults,
}

/// Which elementary streams the source carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaStreams {
    pub video: bool,
    pub audio: bool,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Output time encoded so far.
    pub out_time_secs: f64,

    /// Expected output length.
    pub expected_duration_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

/// What a finished export produced.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    pub elapsed_secs: f64,
}

/// Trait for render backends.
pub trait RenderBackend: Send {
    /// Execute the export job.
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> QuietcutResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Render the plan to `job.output_path` and write the cut report beside it.
///
/// Encoding is blocking work and runs on tokio's blocking pool.
pub async fn export_plan(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> QuietcutResult<ExportSummary> {
    tracing::info!(
        source = %job.source_path.display(),
        output = %job.output_path.display(),
        placements = job.plan.len(),
        mode = ?job.plan.mode(),
        "Starting export"
    );

    QuietcutError::require_file(&job.source_path)?;
    if job.plan.is_empty() {
        return Err(QuietcutError::render("Placement plan is empty"));
    }
    if job.output_path == job.source_path {
        return Err(QuietcutError::render(
            "Output path must differ from the source path",
        ));
    }

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut backend: Box<dyn RenderBackend> = Box::new(FfmpegBackend::new());
    if !backend.is_available() {
        return Err(QuietcutError::tool_missing("ffmpeg"));
    }
    tracing::info!(backend = backend.name(), "Using render backend");

    let started = std::time::Instant::now();
    let job = tokio::task::spawn_blocking(move || backend.render(&job, progress).map(|()| job))
        .await
        .map_err(|e| QuietcutError::render(format!("Export task failed: {e}")))??;
    let elapsed_secs = started.elapsed().as_secs_f64();

    let report_path = write_cut_report(&job, elapsed_secs)?;

    Ok(ExportSummary {
        output_path: job.output_path,
        report_path,
        elapsed_secs,
    })
}

/// ffmpeg `-filter_complex` graph plus the labels to map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    pub graph: String,
    pub video_out: Option<String>,
    pub audio_out: Option<String>,
}

/// Build the filter graph that cuts and joins the plan's placements.
///
/// Every placement becomes a `trim`/`atrim` of input 0. Hard cuts are
/// joined with one `concat`; crossfades chain `xfade`/`acrossfade`, each
/// transition starting at the incoming placement's output start.
pub fn build_filter_graph(plan: &PlacementPlan, streams: MediaStreams) -> QuietcutResult<FilterGraph> {
    if plan.is_empty() {
        return Err(QuietcutError::render("Placement plan is empty"));
    }
    if !streams.video && !streams.audio {
        return Err(QuietcutError::render("Source has neither video nor audio"));
    }

    let placements = plan.placements();
    let count = placements.len();
    let mut filters = Vec::with_capacity(count * 2 + 2);

    for (i, placement) in placements.iter().enumerate() {
        let start = placement.source.start();
        let end = placement.source.end();
        if streams.video {
            filters.push(format!(
                "[0:v]trim=start={start:.6}:end={end:.6},setpts=PTS-STARTPTS[v{i}]"
            ));
        }
        if streams.audio {
            filters.push(format!(
                "[0:a]atrim=start={start:.6}:end={end:.6},asetpts=PTS-STARTPTS[a{i}]"
            ));
        }
    }

    let mut video_out = streams.video.then(|| "v0".to_string());
    let mut audio_out = streams.audio.then(|| "a0".to_string());

    if count > 1 {
        match plan.mode() {
            AssemblyMode::Concatenate => {
                let inputs: String = (0..count)
                    .map(|i| {
                        let mut pads = String::new();
                        if streams.video {
                            pads.push_str(&format!("[v{i}]"));
                        }
                        if streams.audio {
                            pads.push_str(&format!("[a{i}]"));
                        }
                        pads
                    })
                    .collect();
                let mut outputs = String::new();
                if streams.video {
                    outputs.push_str("[vout]");
                    video_out = Some("vout".to_string());
                }
                if streams.audio {
                    outputs.push_str("[aout]");
                    audio_out = Some("aout".to_string());
                }
                filters.push(format!(
                    "{inputs}concat=n={count}:v={}:a={}{outputs}",
                    u8::from(streams.video),
                    u8::from(streams.audio)
                ));
            }
            AssemblyMode::Crossfade { overlap_secs } => {
                if streams.video {
                    let mut previous = "v0".to_string();
                    for (i, placement) in placements.iter().enumerate().skip(1) {
                        let next = if i == count - 1 {
                            "vout".to_string()
                        } else {
                            format!("vx{i}")
                        };
                        filters.push(format!(
                            "[{previous}][v{i}]xfade=transition=fade:duration={overlap_secs:.6}:offset={:.6}[{next}]",
                            placement.output_start
                        ));
                        previous = next;
                    }
                    video_out = Some(previous);
                }
                if streams.audio {
                    let mut previous = "a0".to_string();
                    for i in 1..count {
                        let next = if i == count - 1 {
                            "aout".to_string()
                        } else {
                            format!("ax{i}")
                        };
                        filters.push(format!(
                            "[{previous}][a{i}]acrossfade=d={overlap_secs:.6}:c1=tri:c2=tri[{next}]"
                        ));
                        previous = next;
                    }
                    audio_out = Some(previous);
                }
            }
        }
    }

    Ok(FilterGraph {
        graph: filters.join(";"),
        video_out,
        audio_out,
    })
}

struct FfmpegBackend;

impl FfmpegBackend {
    fn new() -> Self {
        Self
    }

    fn ffmpeg_args(&self, job: &ExportJob, graph: &FilterGraph) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-nostdin", "-hide_banner", "-v", "error", "-nostats"]
            .iter()
            .map(OsString::from)
            .collect();
        args.extend(["-progress", "pipe:1", "-i"].map(OsString::from));
        args.push(job.source_path.clone().into());
        args.push("-filter_complex".into());
        args.push(graph.graph.clone().into());

        for label in [&graph.video_out, &graph.audio_out].into_iter().flatten() {
            args.push("-map".into());
            args.push(format!("[{label}]").into());
        }

        args.extend(
            codec_args_for_settings(&job.settings, job.streams)
                .into_iter()
                .map(OsString::from),
        );
        args.push("-threads".into());
        args.push(encoder_threads(&job.settings).to_string().into());
        args.push(job.output_path.clone().into());
        args
    }

    fn run_ffmpeg(
        &self,
        args: &[OsString],
        expected_duration_secs: f64,
        progress: Option<ProgressCallback>,
    ) -> QuietcutResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| QuietcutError::render(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            expected_duration_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| QuietcutError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| QuietcutError::render("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills up
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        let mut latest_progress = ProgressState::default();
        let mut last_progress_secs = 0.0f64;
        let mut last_progress_wall = std::time::Instant::now();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| QuietcutError::render(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            latest_progress.update(key, value);
            if key != "progress" {
                continue;
            }

            if latest_progress.out_time_secs > last_progress_secs + 0.001 {
                last_progress_secs = latest_progress.out_time_secs;
                last_progress_wall = std::time::Instant::now();
            }
            if let Some(cb) = &progress {
                cb(progress_report(
                    &latest_progress,
                    expected_duration_secs,
                    start.elapsed().as_secs_f64(),
                ));
            }
            if last_progress_wall.elapsed().as_secs() >= 10 {
                tracing::warn!(
                    out_time_secs = latest_progress.out_time_secs,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "No ffmpeg progress advancement for 10s"
                );
                last_progress_wall = std::time::Instant::now();
            }
        }

        let status = child
            .wait()
            .map_err(|e| QuietcutError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(QuietcutError::render(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 1.0,
                out_time_secs: expected_duration_secs,
                expected_duration_secs,
                eta_secs: 0.0,
                stage: ExportStage::Complete,
            });
        }

        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> QuietcutResult<()> {
        let started = std::time::Instant::now();
        let graph = build_filter_graph(&job.plan, job.streams)?;
        let expected_duration_secs = job.plan.output_duration();
        tracing::debug!(graph = %graph.graph, "Built filter graph");

        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 0.0,
                out_time_secs: 0.0,
                expected_duration_secs,
                eta_secs: 0.0,
                stage: ExportStage::Preparing,
            });
        }

        let args = self.ffmpeg_args(job, &graph);
        self.run_ffmpeg(&args, expected_duration_secs, progress)?;

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            output_secs = expected_duration_secs,
            "Export finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

fn codec_args_for_settings(settings: &ExportDefaults, streams: MediaStreams) -> Vec<String> {
    let mut args = Vec::new();
    if streams.video {
        args.extend([
            "-c:v".to_string(),
            settings.video_codec.clone(),
            "-preset".to_string(),
            settings.preset.clone(),
            "-crf".to_string(),
            settings.crf.to_string(),
            "-b:v".to_string(),
            settings.video_bitrate.clone(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);
    }
    if streams.audio {
        args.extend(["-c:a".to_string(), settings.audio_codec.clone()]);
    }
    args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    args
}

fn encoder_threads(settings: &ExportDefaults) -> usize {
    settings.threads.filter(|t| *t > 0).unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // Despite the name, out_time_ms is reported in microseconds
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        expected_duration_secs,
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Encoding
        },
    }
}

#[derive(Debug, Serialize)]
struct CutReport<'a> {
    generated_at: String,
    source: &'a PathBuf,
    output: &'a PathBuf,
    mode: AssemblyMode,
    source_duration_secs: f64,
    kept_secs: f64,
    removed_secs: f64,
    output_duration_secs: f64,
    encode_secs: f64,
    placements: &'a [Placement],
}

/// Write `<output>.cuts.json` describing what was kept.
fn write_cut_report(job: &ExportJob, encode_secs: f64) -> QuietcutResult<PathBuf> {
    let kept_secs = job.plan.source_duration();
    let report = CutReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: &job.source_path,
        output: &job.output_path,
        mode: job.plan.mode(),
        source_duration_secs: job.source_duration_secs,
        kept_secs,
        removed_secs: (job.source_duration_secs - kept_secs).max(0.0),
        output_duration_secs: job.plan.output_duration(),
        encode_secs,
        placements: job.plan.placements(),
    };

    let report_path = job.output_path.with_extension("cuts.json");
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
    tracing::info!(report = %report_path.display(), "Wrote cut report");
    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quietcut_timeline_model::TimeSegment;

    const AV: MediaStreams = MediaStreams {
        video: true,
        audio: true,
    };

    fn plan(mode: AssemblyMode, bounds: &[(f64, f64)]) -> PlacementPlan {
        let overlap = mode.overlap_secs();
        let mut placements: Vec<Placement> = Vec::new();
        for (i, &(s, e)) in bounds.iter().enumerate() {
            let output_start = placements.last().map_or(0.0, |p| p.output_end() - overlap);
            placements.push(Placement {
                source: TimeSegment::new(s, e).unwrap(),
                output_start,
                fade_in: if i > 0 { overlap } else { 0.0 },
                fade_out: if i + 1 < bounds.len() { overlap } else { 0.0 },
            });
        }
        PlacementPlan::new(mode, placements)
    }

    fn job(plan: PlacementPlan, output: PathBuf) -> ExportJob {
        ExportJob {
            source_path: PathBuf::from("/videos/talk.mov"),
            output_path: output,
            plan,
            source_duration_secs: 10.0,
            streams: AV,
            settings: ExportDefaults::default(),
        }
    }

    #[test]
    fn test_concat_graph() {
        let graph = build_filter_graph(
            &plan(AssemblyMode::Concatenate, &[(0.0, 1.0), (2.0, 4.5)]),
            AV,
        )
        .unwrap();

        assert!(graph
            .graph
            .contains("[0:v]trim=start=2.000000:end=4.500000,setpts=PTS-STARTPTS[v1]"));
        assert!(graph
            .graph
            .contains("[0:a]atrim=start=0.000000:end=1.000000,asetpts=PTS-STARTPTS[a0]"));
        assert!(graph
            .graph
            .ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[vout][aout]"));
        assert_eq!(graph.video_out.as_deref(), Some("vout"));
        assert_eq!(graph.audio_out.as_deref(), Some("aout"));
    }

    #[test]
    fn test_crossfade_graph_uses_output_starts_as_offsets() {
        let graph = build_filter_graph(
            &plan(
                AssemblyMode::Crossfade { overlap_secs: 0.5 },
                &[(0.0, 2.0), (3.0, 5.0), (6.0, 8.0)],
            ),
            AV,
        )
        .unwrap();

        assert!(graph
            .graph
            .contains("[v0][v1]xfade=transition=fade:duration=0.500000:offset=1.500000[vx1]"));
        assert!(graph
            .graph
            .contains("[vx1][v2]xfade=transition=fade:duration=0.500000:offset=3.000000[vout]"));
        assert!(graph
            .graph
            .contains("[ax1][a2]acrossfade=d=0.500000:c1=tri:c2=tri[aout]"));
        assert_eq!(graph.video_out.as_deref(), Some("vout"));
    }

    #[test]
    fn test_single_placement_maps_trimmed_streams() {
        let graph = build_filter_graph(
            &plan(AssemblyMode::Crossfade { overlap_secs: 0.3 }, &[(1.0, 2.0)]),
            AV,
        )
        .unwrap();
        assert!(!graph.graph.contains("xfade"));
        assert_eq!(graph.video_out.as_deref(), Some("v0"));
        assert_eq!(graph.audio_out.as_deref(), Some("a0"));
    }

    #[test]
    fn test_video_without_audio() {
        let streams = MediaStreams {
            video: true,
            audio: false,
        };
        let graph = build_filter_graph(
            &plan(AssemblyMode::Concatenate, &[(0.0, 1.0), (2.0, 3.0)]),
            streams,
        )
        .unwrap();
        assert!(!graph.graph.contains("atrim"));
        assert!(graph.graph.ends_with("[v0][v1]concat=n=2:v=1:a=0[vout]"));
        assert_eq!(graph.audio_out, None);

        let codecs = codec_args_for_settings(&ExportDefaults::default(), streams);
        assert!(!codecs.contains(&"-c:a".to_string()));
    }

    #[test]
    fn test_empty_plan_and_streamless_source_rejected() {
        let empty = PlacementPlan::new(AssemblyMode::Concatenate, vec![]);
        assert!(build_filter_graph(&empty, AV).is_err());

        let none = MediaStreams {
            video: false,
            audio: false,
        };
        assert!(build_filter_graph(&plan(AssemblyMode::Concatenate, &[(0.0, 1.0)]), none).is_err());
    }

    #[test]
    fn test_ffmpeg_args_include_codecs_and_maps() {
        let job = job(
            plan(AssemblyMode::Concatenate, &[(0.0, 1.0), (2.0, 3.0)]),
            PathBuf::from("/videos/talk_cleaned.mov"),
        );
        let graph = build_filter_graph(&job.plan, job.streams).unwrap();
        let args: Vec<String> = FfmpegBackend::new()
            .ffmpeg_args(&job, &graph)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(args.windows(2).any(|w| w == ["-progress", "pipe:1"]));
        assert!(args.windows(2).any(|w| w == ["-map", "[vout]"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "slow"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "18"]));
        assert!(args.windows(2).any(|w| w == ["-b:v", "2500k"]));
        assert!(args.windows(2).any(|w| w == ["-movflags", "+faststart"]));
        assert_eq!(args.last().map(String::as_str), Some("/videos/talk_cleaned.mov"));
    }

    #[test]
    fn test_encoder_threads_default_to_available_cores() {
        let mut settings = ExportDefaults::default();
        assert!(encoder_threads(&settings) >= 1);
        settings.threads = Some(3);
        assert_eq!(encoder_threads(&settings), 3);
    }

    #[test]
    fn test_progress_state_parses_ffmpeg_keys() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        assert!((state.out_time_secs - 2.5).abs() < 1e-9);
        state.update("progress", "continue");
        assert!(!state.complete);
        state.update("progress", "end");
        assert!(state.complete);
    }

    #[test]
    fn test_progress_report() {
        let state = ProgressState {
            out_time_secs: 2.0,
            complete: false,
        };
        let report = progress_report(&state, 8.0, 1.0);
        assert!((report.progress - 0.25).abs() < 1e-9);
        assert!((report.eta_secs - 3.0).abs() < 1e-9);
        assert_eq!(report.stage, ExportStage::Encoding);

        let done = ProgressState {
            out_time_secs: 7.9,
            complete: true,
        };
        assert_eq!(progress_report(&done, 8.0, 4.0).progress, 1.0);
        assert_eq!(progress_report(&done, 0.0, 4.0).stage, ExportStage::Finalizing);
    }

    #[test]
    fn test_cut_report_written_beside_output() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(
            plan(AssemblyMode::Concatenate, &[(0.0, 1.0), (2.0, 4.0)]),
            dir.path().join("talk_cleaned.mov"),
        );

        let path = write_cut_report(&job, 1.5).unwrap();
        assert_eq!(path, dir.path().join("talk_cleaned.cuts.json"));

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(report["kept_secs"], 3.0);
        assert_eq!(report["removed_secs"], 7.0);
        assert_eq!(report["mode"]["type"], "concatenate");
        assert_eq!(report["placements"].as_array().unwrap().len(), 2);
        assert!(report["generated_at"].as_str().is_some());
    }
}
