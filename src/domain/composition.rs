//! Resolved composition: the plan turned into concrete frame numbers.

use super::captions::{active_caption_index, lookup_time_ms};
use super::plan::RenderPlan;
use super::timing::frame_to_ms;

/// Name of the vertical clip template.
pub const COMPOSITION_ID: &str = "PodcastClip";

/// A caption shown on frames `[start_frame, end_frame)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub text: String,
    pub start_frame: u64,
    pub end_frame: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub id: &'static str,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub duration_in_frames: u64,
    pub source_start_frame: u64,
    pub cues: Vec<Cue>,
}

impl Composition {
    pub fn select(plan: &RenderPlan) -> Self {
        Self {
            id: COMPOSITION_ID,
            fps: plan.fps(),
            width: plan.width(),
            height: plan.height(),
            duration_in_frames: plan.duration_in_frames(),
            source_start_frame: plan.source_start_frame(),
            cues: cue_sheet(plan),
        }
    }

    /// Cue covering `frame`, if any.
    pub fn cue_at(&self, frame: u64) -> Option<&Cue> {
        self.cues
            .iter()
            .find(|cue| cue.start_frame <= frame && frame < cue.end_frame)
    }
}

/// Splits the clip at every frame where some caption starts or stops
/// matching, resolves each segment once, and merges neighbouring segments
/// that show the same caption.
///
/// Within a segment no caption changes state, so one resolver call per
/// segment gives the same answer as one per frame.
fn cue_sheet(plan: &RenderPlan) -> Vec<Cue> {
    if !plan.show_subtitles() {
        return Vec::new();
    }

    let total = plan.duration_in_frames();
    let lookup = |frame: u64| {
        lookup_time_ms(
            frame_to_ms(frame, plan.fps()),
            plan.start_ms(),
            plan.captions_are_absolute(),
        )
    };

    let mut bounds = vec![0, total];
    for caption in plan.captions() {
        bounds.push(first_frame(total, |f| lookup(f) >= caption.start_ms as f64));
        bounds.push(first_frame(total, |f| lookup(f) > caption.end_ms as f64));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut cues: Vec<(usize, u64, u64)> = Vec::new();
    for pair in bounds.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let active = active_caption_index(
            plan.captions(),
            frame_to_ms(from, plan.fps()),
            plan.start_ms(),
            plan.captions_are_absolute(),
        );
        let Some(index) = active else { continue };
        match cues.last_mut() {
            Some((last, _, end)) if *last == index && *end == from => *end = to,
            _ => cues.push((index, from, to)),
        }
    }

    cues.into_iter()
        .map(|(index, start_frame, end_frame)| close_cue(plan, index, start_frame, end_frame))
        .collect()
}

/// Smallest frame in `0..total` where the monotonic `reached` holds, or
/// `total` if it never does.
fn first_frame(total: u64, reached: impl Fn(u64) -> bool) -> u64 {
    let (mut lo, mut hi) = (0, total);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if reached(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

fn close_cue(plan: &RenderPlan, index: usize, start_frame: u64, end_frame: u64) -> Cue {
    Cue {
        text: plan.captions()[index].text.clone(),
        start_frame,
        end_frame,
    }
}
