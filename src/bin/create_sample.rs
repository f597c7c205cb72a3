//! Renders a built-in sample plan to `public/sample-source.mp4`.

use reelcut::adapters::ffmpeg::{FfmpegRenderer, RealCommandRunner};
use reelcut::config::ServerConfig;
use reelcut::domain::plan::{Caption, RenderPlan, RenderPlanPayload};
use reelcut::ports::renderer::RenderExecutor;
use reelcut::telemetry;
use tracing::{error, info};

const SAMPLE_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

fn sample_plan() -> RenderPlanPayload {
    RenderPlanPayload {
        video_url: Some(SAMPLE_URL.to_string()),
        start_ms: Some(0),
        duration_ms: Some(30000),
        captions: vec![
            Caption::new("Sample Video", 0, 5000),
            Caption::new("This is a test", 5000, 10000),
            Caption::new("Reelcut sample", 10000, 15000),
        ],
        fps: Some(30),
        width: Some(1080),
        height: Some(1920),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();
    telemetry::init_tracing();

    let plan = match RenderPlan::try_from(sample_plan()) {
        Ok(plan) => plan,
        Err(e) => {
            error!(error = %e, "sample plan is invalid");
            std::process::exit(1);
        }
    };

    let output = config.public_dir.join("sample-source.mp4");
    info!(output = %output.display(), "creating sample video");

    let renderer = FfmpegRenderer::new(RealCommandRunner::new(
        config.ffmpeg_bin.clone(),
        config.ffprobe_bin.clone(),
    ));
    match renderer.render(&plan, &output).await {
        Ok(path) => info!(path = %path.display(), "sample video created"),
        Err(e) => {
            error!(error = %e, "sample render failed");
            std::process::exit(1);
        }
    }
}
