//! Per-frame evaluation for the interactive preview.

use super::plan::RenderPlan;
use super::timing::frame_to_ms;
use serde::Serialize;

/// What the player shows at one output frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFrame<'a> {
    pub frame: u64,
    pub duration_in_frames: u64,
    /// Frame of the source video to display.
    pub source_frame: u64,
    /// Elapsed output time at the start of the frame.
    pub time_ms: f64,
    pub caption: Option<&'a str>,
}

/// Returns `None` when `frame` lies outside the clip.
pub fn evaluate(plan: &RenderPlan, frame: u64) -> Option<PreviewFrame<'_>> {
    let duration_in_frames = plan.duration_in_frames();
    if frame >= duration_in_frames {
        return None;
    }

    let time_ms = frame_to_ms(frame, plan.fps());
    let caption = if plan.show_subtitles() {
        plan.caption_at(time_ms).map(|c| c.text.as_str())
    } else {
        None
    };

    Some(PreviewFrame {
        frame,
        duration_in_frames,
        source_frame: plan.source_start_frame().saturating_add(frame),
        time_ms,
        caption,
    })
}
