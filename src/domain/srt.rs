//! SubRip (.srt) reading and writing.

use super::composition::Cue;
use super::plan::Caption;
use super::timing::frame_to_ms;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SrtError {
    #[error("subtitle block {block} has no timing line")]
    MissingTiming { block: usize },
    #[error("subtitle block {block} ends before it starts")]
    InvertedInterval { block: usize },
    #[error("subtitle block {block} has a timestamp out of range")]
    TimestampOutOfRange { block: usize },
}

fn timing_line() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})",
        )
        .expect("valid timing regex")
    })
}

/// Parses SubRip text into captions on the source clock.
pub fn parse(input: &str) -> Result<Vec<Caption>, SrtError> {
    let normalized = input.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut captions = Vec::new();

    let blocks = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty());

    for (i, block) in blocks.enumerate() {
        let block_number = i + 1;
        let mut lines = block.lines().peekable();

        // The numeric counter is optional in practice.
        if lines
            .peek()
            .is_some_and(|line| !timing_line().is_match(line))
        {
            lines.next();
        }

        let timing = lines
            .next()
            .and_then(|line| timing_line().captures(line))
            .ok_or(SrtError::MissingTiming {
                block: block_number,
            })?;

        let (start_ms, end_ms) = timestamp_ms(&timing, 1)
            .zip(timestamp_ms(&timing, 5))
            .ok_or(SrtError::TimestampOutOfRange {
                block: block_number,
            })?;
        if end_ms < start_ms {
            return Err(SrtError::InvertedInterval {
                block: block_number,
            });
        }

        let text = lines.collect::<Vec<_>>().join("\n");
        captions.push(Caption {
            text,
            start_ms,
            end_ms,
        });
    }

    Ok(captions)
}

/// `None` when the hours field does not fit in milliseconds.
fn timestamp_ms(caps: &regex::Captures<'_>, first: usize) -> Option<u64> {
    let field = |n: usize| caps[first + n].parse::<u64>().ok();
    let fraction = &caps[first + 3];
    // "5" means 500ms, "05" means 50ms.
    let millis = format!("{:0<3}", fraction).parse::<u64>().ok()?;
    field(0)?
        .checked_mul(3_600_000)?
        .checked_add(field(1)? * 60_000 + field(2)? * 1000 + millis)
}

/// Writes a cue sheet as SubRip, converting frames to milliseconds.
///
/// Times are floored so a cue never starts after its first frame.
pub fn write(cues: &[Cue], fps: u32) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        let start = frame_to_ms(cue.start_frame, fps).floor() as u64;
        let end = frame_to_ms(cue.end_frame, fps).floor() as u64;
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(start),
            format_timestamp(end),
            cue.text
        );
    }
    out
}

fn format_timestamp(ms: u64) -> String {
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1000) % 60,
        ms % 1000
    )
}
