use std::time::Duration;

use super::{Cue, Dialect};

const VTT_HEADER: &str = "WEBVTT";

/// Serialize cues in the raw form of the target dialect.
///
/// Timings and text survive a round trip through either dialect. Styling does not,
/// it is already gone by the time cues exist.
pub fn convert(cues: &[Cue], to: Dialect) -> String {
    match to {
        Dialect::Srt => to_srt(cues),
        Dialect::Vtt => to_vtt(cues),
        Dialect::Unknown => to_plain(cues),
    }
}

fn to_srt(cues: &[Cue]) -> String {
    cues.iter()
        .enumerate()
        .map(|(position, cue)| format!("{}\n{}", position + 1, cue_body(cue, Dialect::Srt)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_vtt(cues: &[Cue]) -> String {
    let mut out = format!("{}\n", VTT_HEADER);
    for cue in cues {
        out.push('\n');
        out.push_str(&cue_body(cue, Dialect::Vtt));
    }
    out
}

fn to_plain(cues: &[Cue]) -> String {
    cues.iter()
        .flat_map(|cue| cue.lines.iter())
        .map(|line| format!("{}\n", line))
        .collect()
}

/// Timing line followed by the text lines, newline terminated
fn cue_body(cue: &Cue, dialect: Dialect) -> String {
    let separator = dialect.millis_separator();
    let mut body = format!(
        "{} --> {}\n",
        format_timestamp(cue.start, separator),
        format_timestamp(cue.end, separator)
    );
    for line in &cue.lines {
        body.push_str(line);
        body.push('\n');
    }
    body
}

/// Format an offset as `HH:MM:SS<sep>mmm`
pub fn format_timestamp(offset: Duration, separator: char) -> String {
    let total_ms = offset.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, seconds, separator, millis)
}
