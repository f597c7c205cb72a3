//! Millisecond <-> frame conversions.
//!
//! Both the preview endpoint and the ffmpeg renderer go through these
//! functions, so a given plan maps to the same frames on either path.

/// `floor(ms / 1000 * fps)`, computed in integers.
pub fn frame_index(ms: u64, fps: u32) -> u64 {
    let frames = u128::from(ms) * u128::from(fps) / 1000;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

/// Start of `frame` on the output timeline, in milliseconds.
pub fn frame_to_ms(frame: u64, fps: u32) -> f64 {
    (frame as f64 / f64::from(fps)) * 1000.0
}

/// Start of `frame` in seconds, as passed to ffmpeg.
pub fn frame_to_seconds(frame: u64, fps: u32) -> f64 {
    frame as f64 / f64::from(fps)
}
