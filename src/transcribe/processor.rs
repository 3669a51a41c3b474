use tracing::{debug, info};

use crate::captions::{convert, parse_track, select, CaptionTrack, Dialect, TrackMap, Transcript};
use crate::config::CaptionConfig;
use crate::CaptionError;

/// Selected track turned into storable forms
#[derive(Debug, Clone)]
pub struct ProcessedTranscript {
    /// Language of the selected track
    pub language: String,

    /// Dialect the track was fetched in
    pub source_dialect: Dialect,

    /// Dialect of `raw`
    pub raw_dialect: Dialect,

    /// Raw captions as stored
    pub raw: String,

    /// Flattened prose
    pub clean_text: String,

    /// Parsed cues
    pub transcript: Transcript,
}

/// Runs selection, parsing, cleaning and conversion over fetched tracks
#[derive(Debug, Clone)]
pub struct TranscriptProcessor {
    preferred_languages: Vec<String>,
    storage_dialect: Option<Dialect>,
}

impl TranscriptProcessor {
    pub fn new(preferred_languages: Vec<String>, storage_dialect: Option<Dialect>) -> Self {
        Self {
            preferred_languages,
            storage_dialect,
        }
    }

    pub fn from_config(config: &CaptionConfig) -> Self {
        Self::new(config.preferred_languages.clone(), config.storage_dialect)
    }

    /// Pick a track and produce its clean text and stored raw form
    pub fn process(&self, tracks: &TrackMap) -> Result<ProcessedTranscript, CaptionError> {
        let track = select(tracks, self.preferred_languages.as_slice())?;
        info!("Selected {} captions ({})", track.language, track.dialect);

        let transcript = parse_track(track)?;
        let clean_text = transcript.clean_text();
        let (raw_dialect, raw) = self.raw_form(track, &transcript);
        debug!(
            "Cleaned {} cues into {} characters of text",
            transcript.len(),
            clean_text.chars().count()
        );

        Ok(ProcessedTranscript {
            language: track.language.clone(),
            source_dialect: track.dialect,
            raw_dialect,
            raw,
            clean_text,
            transcript,
        })
    }

    /// Untimed payloads are stored as fetched; there are no cue timings to rewrite
    fn raw_form(&self, track: &CaptionTrack, transcript: &Transcript) -> (Dialect, String) {
        match self.storage_dialect {
            Some(target) if track.dialect != Dialect::Unknown => (target, convert(&transcript.cues, target)),
            _ => (track.dialect, track.payload.clone()),
        }
    }
}
