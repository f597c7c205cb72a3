//! Server Binary - Render API with background render workers
//!
//! Wires up:
//! - In-memory job table
//! - ffmpeg-backed render executor
//! - Render dispatcher (bounded, supervised background renders)
//! - HTTP layer (job API, preview, static media)

use reelcut::adapters::ffmpeg::{FfmpegRenderer, RealCommandRunner};
use reelcut::adapters::http::{self, AppState};
use reelcut::adapters::memory::InMemoryJobRepository;
use reelcut::application::dispatcher::{DispatcherSettings, OutputLayout, RenderDispatcher};
use reelcut::application::tracker::JobTracker;
use reelcut::config::ServerConfig;
use reelcut::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    telemetry::init_tracing();

    for dir in [&config.out_dir, &config.public_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "could not create directory");
            std::process::exit(1);
        }
    }

    // 1. Adapters
    let repository = InMemoryJobRepository::new();
    let renderer = FfmpegRenderer::new(RealCommandRunner::new(
        config.ffmpeg_bin.clone(),
        config.ffprobe_bin.clone(),
    ));

    // 2. Application Services
    let tracker = Arc::new(JobTracker::new(Arc::new(repository)));
    let dispatcher = Arc::new(RenderDispatcher::new(
        tracker.clone(),
        Arc::new(renderer),
        DispatcherSettings {
            max_concurrent_renders: config.max_concurrent_renders,
            render_timeout: config.render_timeout,
            output: OutputLayout::new(&config.out_dir, "/media"),
        },
    ));

    // 3. HTTP Layer
    let state = AppState {
        tracker,
        dispatcher: dispatcher.clone(),
    };
    let app = http::router(state, &config.out_dir, &config.public_dir);

    // 4. Start Server
    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind TCP listener");
    info!(
        address = %config.bind_address(),
        max_concurrent_renders = config.max_concurrent_renders,
        "backend listening; rendered files under /media, public files under /public"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");

    dispatcher.shutdown().await;
    info!("all renders finished, exiting");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
