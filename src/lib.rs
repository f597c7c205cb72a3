//! Reelcut - vertical clip rendering service.
//!
//! Hexagonal Architecture:
//! - domain/: Pure logic (plan, timing, captions, composition, preview, jobs)
//! - ports/: Trait definitions (job repository, render executor)
//! - adapters/: Concrete implementations (in-memory store, ffmpeg, HTTP)
//! - application/: Job tracker and render dispatcher
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

// Re-exports for convenience
pub use config::ServerConfig;
pub use domain::captions::active_caption;
pub use domain::plan::{Caption, RenderPlan, RenderPlanPayload};
pub use domain::timing::frame_index;
