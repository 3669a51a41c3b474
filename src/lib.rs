//! Caption Scribe - A Rust CLI tool for turning video caption tracks into clean transcripts
//!
//! This library fetches caption tracks through an extraction tool such as yt-dlp, picks the
//! best track for a language preference list, parses SRT or WebVTT payloads into cues and
//! flattens them into clean prose stored next to the video metadata.

pub mod captions;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod transcribe;
pub mod utils;

pub use captions::{CaptionTrack, Cue, Dialect, TrackMap, Transcript};
pub use cli::{Cli, Commands, LogFormat, TextFormat};
pub use config::Config;
pub use extractors::{CaptionSource, FetchRequest, FetchedMedia, VideoMetadata};
pub use output::TranscriptArtifact;
pub use transcribe::{ProcessedTranscript, TranscriptPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to caption processing
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    #[error("Malformed {dialect} captions: {reason}")]
    MalformedCaption { dialect: Dialect, reason: String },

    #[error("No caption track available")]
    NoTrackAvailable,

    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("Caption extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("File operation failed: {0}")]
    FileError(String),
}
