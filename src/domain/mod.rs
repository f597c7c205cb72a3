//! Domain layer - Pure business logic.
//!
//! `timing` and `captions` are shared by the preview and the renderer.

pub mod captions;
pub mod composition;
pub mod jobs;
pub mod plan;
pub mod preview;
pub mod srt;
pub mod timing;
