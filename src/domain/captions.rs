//! Active caption lookup.

use super::plan::Caption;

/// Time the caption intervals are measured against.
///
/// Absolute captions live on the source clock, so the clip offset is added.
pub fn lookup_time_ms(now_ms: f64, start_ms: u64, captions_are_absolute: bool) -> f64 {
    if captions_are_absolute {
        now_ms + start_ms as f64
    } else {
        now_ms
    }
}

/// Position of the caption shown at `now_ms`, if any.
///
/// The first caption in list order whose `[start_ms, end_ms]` contains the
/// lookup time wins, even when later captions overlap it.
pub fn active_caption_index(
    captions: &[Caption],
    now_ms: f64,
    start_ms: u64,
    captions_are_absolute: bool,
) -> Option<usize> {
    let t = lookup_time_ms(now_ms, start_ms, captions_are_absolute);
    captions
        .iter()
        .position(|c| c.start_ms as f64 <= t && t <= c.end_ms as f64)
}

pub fn active_caption<'a>(
    captions: &'a [Caption],
    now_ms: f64,
    start_ms: u64,
    captions_are_absolute: bool,
) -> Option<&'a Caption> {
    active_caption_index(captions, now_ms, start_ms, captions_are_absolute).map(|i| &captions[i])
}
