use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::captions::Dialect;

#[derive(Parser)]
#[command(
    name = "captionscribe",
    about = "Caption Scribe - Turn video captions into clean transcript JSON",
    version,
    long_about = "A CLI tool that fetches video metadata and caption tracks with yt-dlp, picks the best track for your language preferences and stores the raw captions next to clean, markup-free transcript text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metadata and captions for a video and write the transcript JSON
    Fetch {
        /// Video URL, caption file or directory of caption files
        #[arg(value_name = "URL_OR_PATH")]
        url: String,

        /// Output file path (defaults to <output_dir>/<slugified url>.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Preferred language pattern, repeatable, most preferred first (e.g. fr, en.*, *)
        #[arg(short, long = "lang", value_name = "PATTERN")]
        languages: Vec<String>,

        /// Dialect used for the stored raw captions
        #[arg(short, long, value_enum)]
        dialect: Option<DialectArg>,

        /// Leave the full metadata dump out of the output
        #[arg(long)]
        no_dump: bool,

        /// Print the JSON instead of writing a file
        #[arg(long)]
        print: bool,
    },

    /// Parse a local caption file and print its clean text
    Clean {
        /// Caption file (.srt, .vtt or anything else as plain text)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Dialect of the file (inferred from the extension if not specified)
        #[arg(short, long, value_enum)]
        dialect: Option<DialectArg>,

        /// Language tag of the captions
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: TextFormat,
    },

    /// Convert a caption file between SRT and WebVTT
    Convert {
        /// Caption file to convert
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target dialect
        #[arg(short, long, value_enum)]
        to: DialectArg,

        /// Dialect of the input file (inferred from the extension if not specified)
        #[arg(long, value_enum)]
        from: Option<DialectArg>,

        /// Output file or directory (prints to console if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported platforms
    Platforms,
}

/// Caption dialects accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialectArg {
    /// SubRip
    Srt,
    /// WebVTT
    Vtt,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Srt => Dialect::Srt,
            DialectArg::Vtt => Dialect::Vtt,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextFormat {
    /// Clean text only
    Text,
    /// JSON with cues and clean text
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextFormat::Text => write!(f, "text"),
            TextFormat::Json => write!(f, "json"),
            TextFormat::Srt => write!(f, "srt"),
            TextFormat::Vtt => write!(f, "vtt"),
        }
    }
}
