use crate::domain::plan::RenderPlan;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not read source {url}: {detail}")]
    Probe { url: String, detail: String },
    #[error("source {0} has no video stream")]
    NoVideoStream(String),
    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),
    #[error("render produced no output at {0}")]
    MissingOutput(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("clip of {duration_ms}ms at {fps}fps has no frames")]
    EmptyClip { duration_ms: u64, fps: u32 },
    #[error("render timed out after {0:?}")]
    TimedOut(Duration),
    #[error("render task panicked: {0}")]
    Panicked(String),
    #[error("render task was cancelled")]
    Cancelled,
}

/// The slow part: turn a plan into a video file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderExecutor: Send + Sync {
    /// Render `plan` to `output`. Returns the written path.
    async fn render(&self, plan: &RenderPlan, output: &Path) -> Result<PathBuf, RenderError>;
}
