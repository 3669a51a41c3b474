use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::captions::{Dialect, Transcript};
use crate::cli::TextFormat;
use crate::extractors::VideoMetadata;
use crate::transcribe::ProcessedTranscript;

/// The persisted document for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptArtifact {
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub duration: Option<f64>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<u64>,
    #[serde(rename = "uploadDate")]
    pub upload_date: Option<String>,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    pub transcript: TranscriptSection,

    /// Full metadata dump as a fallback for fields not extracted above
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump: Option<Value>,
    pub generated_at: DateTime<Utc>,
}

/// Transcript fields; all null when no usable captions were found
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSection {
    pub lang: Option<String>,
    pub dialect: Option<Dialect>,
    /// Dialect the captions were fetched in, before conversion
    pub source_dialect: Option<Dialect>,
    pub raw: Option<String>,
    pub clean_text: Option<String>,
    pub cue_count: usize,
    pub has_transcript: bool,
}

impl TranscriptSection {
    pub fn from_processed(processed: &ProcessedTranscript) -> Self {
        Self {
            lang: Some(processed.language.clone()),
            dialect: Some(processed.raw_dialect),
            source_dialect: Some(processed.source_dialect),
            raw: Some(processed.raw.clone()).filter(|raw| !raw.trim().is_empty()),
            clean_text: Some(processed.clean_text.clone()).filter(|text| !text.is_empty()),
            cue_count: processed.transcript.len(),
            has_transcript: true,
        }
    }
}

impl TranscriptArtifact {
    pub fn new(
        video_url: &str,
        metadata: VideoMetadata,
        processed: Option<&ProcessedTranscript>,
        include_dump: bool,
    ) -> Self {
        let thumbnail_url = metadata.best_thumbnail();

        Self {
            video_url: video_url.to_string(),
            id: metadata.id,
            title: metadata.title,
            description: metadata.description,
            channel: metadata.channel,
            channel_id: metadata.channel_id,
            duration: metadata.duration,
            view_count: metadata.view_count,
            upload_date: metadata.upload_date,
            thumbnail_url,
            transcript: processed.map(TranscriptSection::from_processed).unwrap_or_default(),
            dump: include_dump.then_some(metadata.raw),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize transcript")
    }
}

/// Save the artifact as pretty JSON, creating parent directories
pub async fn save_to_file(artifact: &TranscriptArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }

    fs_err::write(path, artifact.to_json()?)?;
    Ok(())
}

/// Print the artifact to the console
pub fn print_to_console(artifact: &TranscriptArtifact) -> Result<()> {
    println!("{}", artifact.to_json()?);
    Ok(())
}

#[derive(Serialize)]
struct CueView<'a> {
    index: usize,
    start_ms: u64,
    end_ms: u64,
    duration_ms: u64,
    text: String,
    lines: &'a [String],
}

#[derive(Serialize)]
struct TranscriptView<'a> {
    lang: Option<&'a str>,
    dialect: Dialect,
    cue_count: usize,
    duration_ms: u64,
    cues: Vec<CueView<'a>>,
    clean_text: String,
}

/// Render a parsed transcript in one of the offline output formats
pub fn render_transcript(transcript: &Transcript, format: TextFormat) -> Result<String> {
    let content = match format {
        TextFormat::Text => transcript.clean_text(),
        TextFormat::Srt => transcript.to_dialect(Dialect::Srt),
        TextFormat::Vtt => transcript.to_dialect(Dialect::Vtt),
        TextFormat::Json => {
            let view = TranscriptView {
                lang: transcript.language.as_deref(),
                dialect: transcript.dialect,
                cue_count: transcript.len(),
                duration_ms: transcript.duration().as_millis() as u64,
                cues: transcript
                    .cues
                    .iter()
                    .map(|cue| CueView {
                        index: cue.sequence_index,
                        start_ms: cue.start.as_millis() as u64,
                        end_ms: cue.end.as_millis() as u64,
                        duration_ms: cue.duration().as_millis() as u64,
                        text: cue.text(),
                        lines: &cue.lines,
                    })
                    .collect(),
                clean_text: transcript.clean_text(),
            };
            serde_json::to_string_pretty(&view).context("Failed to serialize transcript")?
        }
    };

    Ok(content)
}
