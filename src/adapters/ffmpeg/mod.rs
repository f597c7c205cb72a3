//! Render executor backed by the ffmpeg command-line tools.

pub mod cmd;
mod renderer;

pub use cmd::{CommandRunner, RealCommandRunner};
pub use renderer::FfmpegRenderer;
