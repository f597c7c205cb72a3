//! Render plan: the immutable description of one clip.

use super::captions;
use super::timing::frame_index;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 1920;

/// One timed caption. The interval is matched inclusively on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Caption {
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }
}

/// Plan as received from a caller, before validation.
///
/// Numbers are signed so that negative values reach validation and get a
/// readable rejection instead of a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlanPayload {
    pub video_url: Option<String>,
    pub start_ms: Option<i64>,
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub captions: Vec<Caption>,
    pub fps: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub show_subtitles: Option<bool>,
    pub captions_are_absolute: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("videoUrl is required")]
    MissingVideoUrl,
    #[error("durationMs is required")]
    MissingDuration,
    #[error("durationMs must be positive, got {0}")]
    NonPositiveDuration(i64),
    #[error("startMs must not be negative, got {0}")]
    NegativeStart(i64),
    #[error("fps must be a positive integer, got {0}")]
    InvalidFps(i64),
    #[error("{field} must be a positive integer, got {value}")]
    InvalidDimension { field: &'static str, value: i64 },
}

/// A validated plan. Only obtainable through [`RenderPlan::try_from`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    video_url: String,
    start_ms: u64,
    duration_ms: u64,
    captions: Vec<Caption>,
    fps: u32,
    width: u32,
    height: u32,
    show_subtitles: bool,
    captions_are_absolute: bool,
}

impl TryFrom<RenderPlanPayload> for RenderPlan {
    type Error = PlanError;

    fn try_from(payload: RenderPlanPayload) -> Result<Self, Self::Error> {
        let video_url = payload
            .video_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .ok_or(PlanError::MissingVideoUrl)?;

        let duration_ms = match payload.duration_ms {
            None => return Err(PlanError::MissingDuration),
            Some(ms) if ms <= 0 => return Err(PlanError::NonPositiveDuration(ms)),
            Some(ms) => ms as u64,
        };

        let start_ms = match payload.start_ms.unwrap_or(0) {
            ms if ms < 0 => return Err(PlanError::NegativeStart(ms)),
            ms => ms as u64,
        };

        let fps = positive_u32(payload.fps, DEFAULT_FPS).map_err(PlanError::InvalidFps)?;
        let width = positive_u32(payload.width, DEFAULT_WIDTH).map_err(|value| {
            PlanError::InvalidDimension {
                field: "width",
                value,
            }
        })?;
        let height = positive_u32(payload.height, DEFAULT_HEIGHT).map_err(|value| {
            PlanError::InvalidDimension {
                field: "height",
                value,
            }
        })?;

        Ok(Self {
            video_url,
            start_ms,
            duration_ms,
            captions: payload.captions,
            fps,
            width,
            height,
            show_subtitles: payload.show_subtitles.unwrap_or(true),
            captions_are_absolute: payload.captions_are_absolute.unwrap_or(false),
        })
    }
}

fn positive_u32(value: Option<i64>, default: u32) -> Result<u32, i64> {
    match value {
        None => Ok(default),
        Some(v) => u32::try_from(v).ok().filter(|v| *v > 0).ok_or(v),
    }
}

impl RenderPlan {
    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn captions(&self) -> &[Caption] {
        &self.captions
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn show_subtitles(&self) -> bool {
        self.show_subtitles
    }

    pub fn captions_are_absolute(&self) -> bool {
        self.captions_are_absolute
    }

    /// Output clip length in frames.
    pub fn duration_in_frames(&self) -> u64 {
        frame_index(self.duration_ms, self.fps)
    }

    /// Frame of the source video where playback begins.
    pub fn source_start_frame(&self) -> u64 {
        frame_index(self.start_ms, self.fps)
    }

    /// Caption active at `now_ms` on the output timeline.
    pub fn caption_at(&self, now_ms: f64) -> Option<&Caption> {
        captions::active_caption(
            &self.captions,
            now_ms,
            self.start_ms,
            self.captions_are_absolute,
        )
    }
}
