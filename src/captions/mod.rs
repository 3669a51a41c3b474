use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub mod convert;
pub mod markup;
pub mod normalize;
pub mod parser;
pub mod select;

pub use convert::convert;
pub use markup::strip;
pub use normalize::normalize;
pub use parser::{parse, parse_track};
pub use select::{select, LanguagePattern};

/// Candidate tracks keyed by language tag.
///
/// Ordered so that "first encountered" means the same thing on every run.
pub type TrackMap = BTreeMap<String, Vec<CaptionTrack>>;

/// Supported caption markup dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// SubRip: numbered blocks with comma timestamps
    Srt,
    /// WebVTT: header line and period timestamps
    Vtt,
    /// Anything else, handled as raw text
    Unknown,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Srt => "srt",
            Dialect::Vtt => "vtt",
            Dialect::Unknown => "unknown",
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "srt" => Dialect::Srt,
            "vtt" | "webvtt" => Dialect::Vtt,
            _ => Dialect::Unknown,
        }
    }

    /// Infer the dialect from a file name's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Dialect::Unknown)
    }

    /// File extension used when writing this dialect
    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Srt => "srt",
            Dialect::Vtt => "vtt",
            Dialect::Unknown => "txt",
        }
    }

    /// Separator written between seconds and milliseconds
    pub fn millis_separator(&self) -> char {
        match self {
            Dialect::Srt => ',',
            Dialect::Vtt | Dialect::Unknown => '.',
        }
    }

    /// Selection rank, lower wins
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Dialect::Srt => 0,
            Dialect::Vtt => 1,
            Dialect::Unknown => 2,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A language-tagged caption source as fetched from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language tag, e.g. "fr" or "en-US"
    pub language: String,

    /// Markup dialect of the payload
    pub dialect: Dialect,

    /// Raw caption text
    pub payload: String,
}

impl CaptionTrack {
    pub fn new(language: impl Into<String>, dialect: Dialect, payload: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            dialect,
            payload: payload.into(),
        }
    }
}

/// One timed unit of dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based position in parse order
    pub sequence_index: usize,

    /// Offset at which the cue appears
    pub start: Duration,

    /// Offset at which the cue disappears, never before `start`
    pub end: Duration,

    /// Markup-free text lines, never empty
    pub lines: Vec<String>,
}

impl Cue {
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    /// Lines joined by a single space
    pub fn text(&self) -> String {
        self.lines.join(" ").trim().to_string()
    }
}

/// Result of parsing one caption payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Dialect the cues were parsed from
    pub dialect: Dialect,

    /// Language of the track the payload came from, if known
    pub language: Option<String>,

    /// Cues in source order
    pub cues: Vec<Cue>,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Largest end offset seen in the cue stream
    pub fn duration(&self) -> Duration {
        self.cues.iter().map(|cue| cue.end).max().unwrap_or_default()
    }

    /// Flattened, markup-free prose
    pub fn clean_text(&self) -> String {
        normalize(&self.cues)
    }

    /// Serialize the cues in another dialect
    pub fn to_dialect(&self, dialect: Dialect) -> String {
        convert(&self.cues, dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_extension() {
        assert_eq!(Dialect::from_extension("srt"), Dialect::Srt);
        assert_eq!(Dialect::from_extension("VTT"), Dialect::Vtt);
        assert_eq!(Dialect::from_extension("ttml"), Dialect::Unknown);
        assert_eq!(Dialect::from_path(Path::new("abc.fr.srt")), Dialect::Srt);
        assert_eq!(Dialect::from_path(Path::new("no_extension")), Dialect::Unknown);
    }

    #[test]
    fn test_dialect_priority_order() {
        assert!(Dialect::Srt.priority() < Dialect::Vtt.priority());
        assert!(Dialect::Vtt.priority() < Dialect::Unknown.priority());
    }

    #[test]
    fn test_transcript_duration_uses_latest_end() {
        let transcript = Transcript {
            dialect: Dialect::Srt,
            language: None,
            cues: vec![
                Cue {
                    sequence_index: 1,
                    start: Duration::from_millis(0),
                    end: Duration::from_millis(4_000),
                    lines: vec!["late end".to_string()],
                },
                Cue {
                    sequence_index: 2,
                    start: Duration::from_millis(1_000),
                    end: Duration::from_millis(2_000),
                    lines: vec!["early end".to_string()],
                },
            ],
        };

        assert_eq!(transcript.duration(), Duration::from_millis(4_000));
        assert_eq!(transcript.cues[1].duration(), Duration::from_millis(1_000));
    }
}
