use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use tokio::process::Command as TokioCommand;

/// Runs the ffmpeg command-line tools. Mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_ffprobe(&self, args: Vec<String>) -> io::Result<Output>;
    async fn run_ffmpeg(&self, args: Vec<String>) -> io::Result<Output>;
}

#[derive(Clone, Debug)]
pub struct RealCommandRunner {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl RealCommandRunner {
    pub fn new(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    async fn run(program: &str, args: Vec<String>) -> io::Result<Output> {
        // kill_on_drop: an aborted render must not leave ffmpeg running.
        TokioCommand::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
    }
}

impl Default for RealCommandRunner {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[async_trait]
impl CommandRunner for RealCommandRunner {
    async fn run_ffprobe(&self, args: Vec<String>) -> io::Result<Output> {
        Self::run(&self.ffprobe_bin, args).await
    }

    async fn run_ffmpeg(&self, args: Vec<String>) -> io::Result<Output> {
        Self::run(&self.ffmpeg_bin, args).await
    }
}
