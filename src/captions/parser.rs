use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::time::Duration;
use tracing::{debug, warn};

use super::{markup, CaptionTrack, Cue, Dialect, Transcript};
use crate::CaptionError;

/// Timing line: `HH:MM:SS.mmm --> HH:MM:SS.mmm`, hours optional, either millisecond
/// separator, anything after the end offset ignored (positioning directives)
static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(\d+):)?([0-5]?\d):([0-5]\d)[.,](\d{3})\s*-->\s*(?:(\d+):)?([0-5]?\d):([0-5]\d)[.,](\d{3})(?:\s.*)?$",
    )
    .expect("valid timing line regex")
});

const VTT_HEADER: &str = "WEBVTT";

/// Blocks starting with these keywords carry no dialogue
const VTT_METADATA_KEYWORDS: &[&str] = &["NOTE", "STYLE", "REGION"];

/// A run of non-blank lines
struct Block<'a> {
    /// 1-based line number of the first line, for diagnostics
    line_number: usize,
    lines: Vec<&'a str>,
}

/// Parse a caption payload into a transcript.
///
/// Bad blocks are skipped. Fails only when nothing usable is left after a full scan.
pub fn parse(payload: &str, dialect: Dialect) -> Result<Transcript, CaptionError> {
    let payload = payload.trim_start_matches('\u{feff}');

    let cues = match dialect {
        Dialect::Vtt => parse_vtt(payload),
        Dialect::Srt => parse_srt(payload),
        Dialect::Unknown => parse_passthrough(payload),
    };

    if cues.is_empty() {
        return Err(CaptionError::MalformedCaption {
            dialect,
            reason: "no recognizable cues found".to_string(),
        });
    }

    debug!("Parsed {} {} cues", cues.len(), dialect);

    Ok(Transcript {
        dialect,
        language: None,
        cues,
    })
}

/// Parse a fetched track, carrying its language over to the transcript
pub fn parse_track(track: &CaptionTrack) -> Result<Transcript, CaptionError> {
    let mut transcript = parse(&track.payload, track.dialect)?;
    transcript.language = Some(track.language.clone());
    Ok(transcript)
}

fn parse_vtt(payload: &str) -> Vec<Cue> {
    let mut cues = Vec::new();

    for (position, block) in split_blocks(payload).into_iter().enumerate() {
        let first = block.lines[0].trim();

        if position == 0 && first.starts_with(VTT_HEADER) {
            continue;
        }

        if is_vtt_metadata(first) {
            debug!("Skipping VTT metadata block at line {}", block.line_number);
            continue;
        }

        // The timing line may be preceded by a cue identifier
        let timing_at = if TIMING_LINE.is_match(block.lines[0]) {
            0
        } else if block.lines.len() > 1
            && !block.lines[0].contains("-->")
            && TIMING_LINE.is_match(block.lines[1])
        {
            1
        } else {
            warn!("Discarding VTT block without timing line at line {}", block.line_number);
            continue;
        };

        push_cue(&mut cues, &block, timing_at);
    }

    cues
}

fn parse_srt(payload: &str) -> Vec<Cue> {
    let mut cues = Vec::new();

    for block in split_blocks(payload) {
        let first = block.lines[0].trim();

        // The source index is never trusted, and a missing one is tolerated
        let timing_at = if is_index_line(first) && block.lines.len() > 1 && TIMING_LINE.is_match(block.lines[1]) {
            1
        } else if TIMING_LINE.is_match(block.lines[0]) {
            0
        } else {
            warn!("Discarding SRT block without timing line at line {}", block.line_number);
            continue;
        };

        push_cue(&mut cues, &block, timing_at);
    }

    cues
}

/// Treat the whole payload as a single untimed cue
fn parse_passthrough(payload: &str) -> Vec<Cue> {
    let lines = clean_lines(payload.lines());
    if lines.is_empty() {
        return Vec::new();
    }

    vec![Cue {
        sequence_index: 1,
        start: Duration::ZERO,
        end: Duration::ZERO,
        lines,
    }]
}

/// Build a cue from the timing line at `timing_at` and the text lines after it
fn push_cue(cues: &mut Vec<Cue>, block: &Block<'_>, timing_at: usize) {
    let line_number = block.line_number + timing_at;

    let Some((start, end)) = parse_timing_line(block.lines[timing_at]) else {
        warn!("Skipping cue with unparseable timing at line {}", line_number);
        return;
    };

    if end < start {
        warn!("Skipping cue ending before it starts at line {}", line_number);
        return;
    }

    let lines = clean_lines(block.lines[timing_at + 1..].iter().copied());
    if lines.is_empty() {
        debug!("Dropping cue without text at line {}", line_number);
        return;
    }

    cues.push(Cue {
        sequence_index: cues.len() + 1,
        start,
        end,
        lines,
    });
}

/// Strip markup from each line and drop the ones left blank
fn clean_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(|line| markup::strip(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split a payload into blocks of non-blank lines.
///
/// An empty line always ends a block. A whitespace-only line ends one only when the
/// next non-blank line opens a new cue or the input ends; otherwise it is dropped and
/// the cue carries on.
fn split_blocks(payload: &str) -> Vec<Block<'_>> {
    let lines: Vec<&str> = payload.lines().collect();
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (index, &line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if !line.is_empty() && current.is_some() && !opens_block_after(&lines, index + 1) {
                continue;
            }
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }

        current
            .get_or_insert_with(|| Block {
                line_number: index + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}

/// Whether the first non-blank line at or after `from` starts a cue, either as a timing
/// line or as an index/identifier line followed by one. End of input counts as a start.
fn opens_block_after(lines: &[&str], from: usize) -> bool {
    let Some(next) = (from..lines.len()).find(|&i| !lines[i].trim().is_empty()) else {
        return true;
    };

    TIMING_LINE.is_match(lines[next])
        || (!lines[next].contains("-->")
            && lines.get(next + 1).map_or(false, |following| TIMING_LINE.is_match(following)))
}

fn is_vtt_metadata(first_line: &str) -> bool {
    VTT_METADATA_KEYWORDS.iter().any(|keyword| {
        first_line
            .strip_prefix(keyword)
            .map(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .unwrap_or(false)
    })
}

fn is_index_line(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Parse a timing line into its start and end offsets
pub fn parse_timing_line(line: &str) -> Option<(Duration, Duration)> {
    let caps = TIMING_LINE.captures(line)?;
    Some((offset_from_captures(&caps, 1)?, offset_from_captures(&caps, 5)?))
}

/// Read hours, minutes, seconds and milliseconds starting at capture group `first`
fn offset_from_captures(caps: &Captures<'_>, first: usize) -> Option<Duration> {
    let hours: u64 = match caps.get(first) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: u64 = caps.get(first + 1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(first + 2)?.as_str().parse().ok()?;
    let millis: u64 = caps.get(first + 3)?.as_str().parse().ok()?;

    let total_ms = hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)?;

    Some(Duration::from_millis(total_ms))
}
