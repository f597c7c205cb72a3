use super::cmd::CommandRunner;
use crate::domain::composition::Composition;
use crate::domain::plan::RenderPlan;
use crate::domain::srt;
use crate::domain::timing::frame_to_seconds;
use crate::ports::renderer::{RenderError, RenderExecutor};
use async_trait::async_trait;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders a plan with `ffprobe` + `ffmpeg`:
/// probe the source, resolve the composition, then encode exactly
/// `duration_in_frames` frames with the captions burned in.
pub struct FfmpegRenderer<C> {
    runner: C,
}

impl<C: CommandRunner> FfmpegRenderer<C> {
    pub fn new(runner: C) -> Self {
        Self { runner }
    }

    /// Returns the codec of the first video stream.
    async fn probe(&self, url: &str) -> Result<String, RenderError> {
        let args = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            "-i",
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let output = self
            .runner
            .run_ffprobe(args)
            .await
            .map_err(|e| RenderError::Probe {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RenderError::Probe {
                url: url.to_string(),
                detail: stderr_tail(&output.stderr),
            });
        }

        let codec = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if codec.is_empty() {
            return Err(RenderError::NoVideoStream(url.to_string()));
        }
        Ok(codec)
    }
}

#[async_trait]
impl<C: CommandRunner> RenderExecutor for FfmpegRenderer<C> {
    async fn render(&self, plan: &RenderPlan, output: &Path) -> Result<PathBuf, RenderError> {
        if plan.duration_in_frames() == 0 {
            return Err(RenderError::EmptyClip {
                duration_ms: plan.duration_ms(),
                fps: plan.fps(),
            });
        }

        let codec = self.probe(plan.video_url()).await?;
        let composition = Composition::select(plan);
        debug!(
            composition = composition.id,
            codec = %codec,
            frames = composition.duration_in_frames,
            cues = composition.cues.len(),
            "composition selected"
        );

        let scratch = tempfile::tempdir()?;
        let subtitles = if composition.cues.is_empty() {
            None
        } else {
            let path = scratch.path().join("captions.srt");
            tokio::fs::write(&path, srt::write(&composition.cues, composition.fps)).await?;
            Some(path)
        };

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = PartialOutput::new(partial_path(output));

        let args = ffmpeg_args(
            plan.video_url(),
            &composition,
            subtitles.as_deref(),
            partial.path(),
        );
        let result = self.runner.run_ffmpeg(args).await?;
        if !result.status.success() {
            return Err(RenderError::Ffmpeg(stderr_tail(&result.stderr)));
        }
        if !tokio::fs::try_exists(partial.path()).await.unwrap_or(false) {
            return Err(RenderError::MissingOutput(partial.path().to_path_buf()));
        }

        // Readers of `output` never see a half-written file.
        tokio::fs::rename(partial.path(), output).await?;
        partial.keep();
        info!(output = %output.display(), "render written");
        Ok(output.to_path_buf())
    }
}

/// In-progress ffmpeg output, removed on drop unless kept.
///
/// Dropping covers the error returns as well as a render future that is
/// aborted mid-encode, so no `.part` file is left next to finished clips.
struct PartialOutput {
    path: PathBuf,
    keep: bool,
}

impl PartialOutput {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    output.with_file_name(format!("{}.part", name))
}

fn ffmpeg_args(
    source: &str,
    composition: &Composition,
    subtitles: Option<&Path>,
    output: &Path,
) -> Vec<String> {
    let fps = composition.fps;
    let seek = frame_to_seconds(composition.source_start_frame, fps);
    let length = frame_to_seconds(composition.duration_in_frames, fps);

    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{:.6}", seek),
        "-i".to_string(),
        source.to_string(),
        "-t".to_string(),
        format!("{:.6}", length),
        "-vf".to_string(),
        video_filter(composition, subtitles),
        "-frames:v".to_string(),
        composition.duration_in_frames.to_string(),
        "-r".to_string(),
        fps.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-f".to_string(),
        "mp4".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Letterboxes the source onto a black canvas of the composition size.
fn video_filter(composition: &Composition, subtitles: Option<&Path>) -> String {
    let (w, h) = (composition.width, composition.height);
    let mut filter = format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1,fps={fps}",
        fps = composition.fps
    );
    if let Some(path) = subtitles {
        let _ = write!(
            filter,
            ",subtitles=filename='{}':force_style='Alignment=2,Fontsize=8,Outline=1,Shadow=1,MarginV=7'",
            escape_filter_path(path)
        );
    }
    filter
}

fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

/// Last few lines of a tool's stderr, enough for a job error message.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = lines[lines.len().saturating_sub(5)..].join("\n");
    if tail.is_empty() {
        "no error output".to_string()
    } else {
        tail
    }
}
