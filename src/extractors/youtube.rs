use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

use super::{collect_tracks, CaptionSource, CookieJar, FetchRequest, FetchedMedia, VideoMetadata};
use crate::{CaptionError, Result};

/// Caption formats requested from yt-dlp, best first
const SUBTITLE_FORMATS: &str = "srt/vtt/best";

/// YouTube caption source using yt-dlp
pub struct YoutubeSource {
    yt_dlp_path: String,
    cookies: Option<CookieJar>,
    temp_root: Option<PathBuf>,
    show_progress: bool,
}

impl YoutubeSource {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            cookies: None,
            temp_root: None,
            show_progress: true,
        }
    }

    /// Authenticate requests with a cookie file
    pub fn with_cookies(mut self, cookies: CookieJar) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Write subtitles under this directory instead of the system temp dir
    pub fn with_temp_root(mut self, dir: PathBuf) -> Self {
        self.temp_root = Some(dir);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.yt_dlp_path);
        command
            .args(["--no-playlist", "--no-warnings", "--no-check-certificates"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cookies) = &self.cookies {
            command.arg("--cookies").arg(cookies.path());
        }

        command
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = self.base_command().args(["--dump-json", url]).output().await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(CaptionError::ExtractionFailed(format!("yt-dlp failed: {}", error.trim())).into());
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }

    /// Have yt-dlp write caption files for the requested languages into `dir`
    async fn download_captions(&self, url: &str, languages: &[String], dir: &Path) -> Result<()> {
        let template = dir.join("%(id)s.%(ext)s");
        let sub_langs = yt_dlp_sub_langs(languages);
        tracing::debug!("Downloading captions ({}) for: {}", sub_langs, url);

        let output = self
            .base_command()
            .args(["--skip-download", "--write-subs", "--write-auto-subs"])
            .args(["--sub-format", SUBTITLE_FORMATS])
            .args(["--sub-langs", sub_langs.as_str()])
            .arg("--output")
            .arg(&template)
            .arg(url)
            .output()
            .await?;

        // Some languages may still have been written, e.g. when one of them hit a rate limit
        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("yt-dlp reported errors while fetching captions: {}", error.trim());
        }

        Ok(())
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            progress.set_style(style);
        }
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

/// yt-dlp spells the wildcard `all`
fn yt_dlp_sub_langs(languages: &[String]) -> String {
    if languages.is_empty() {
        return "all".to_string();
    }

    languages
        .iter()
        .map(|pattern| if pattern.trim() == "*" { "all" } else { pattern.trim() })
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl CaptionSource for YoutubeSource {
    async fn fetch_captions(&self, url: &str, request: &FetchRequest) -> Result<FetchedMedia> {
        if !self.check_availability().await {
            return Err(CaptionError::ExtractionFailed(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp".to_string(),
            )
            .into());
        }

        let progress = self.spinner("Fetching video metadata...");
        let info = self.get_video_info(url).await;
        progress.finish_and_clear();
        let metadata = VideoMetadata::from_info(info?);

        let dir = match &self.temp_root {
            Some(root) => {
                fs_err::create_dir_all(root)?;
                TempDir::new_in(root)
            }
            None => TempDir::new(),
        }
        .map_err(|e| CaptionError::FileError(format!("could not create caption directory: {}", e)))?;

        let progress = self.spinner("Downloading captions with yt-dlp...");
        let downloaded = self.download_captions(url, &request.languages, dir.path()).await;
        progress.finish_and_clear();
        downloaded?;

        let tracks = collect_tracks(dir.path(), metadata.id.as_deref())?;
        tracing::info!(
            "Found captions in {} language(s) for {}",
            tracks.len(),
            metadata.id.as_deref().unwrap_or(url)
        );

        Ok(FetchedMedia { metadata, tracks })
    }

    fn supports_url(&self, url: &str) -> bool {
        let url_lower = url.to_lowercase();
        url_lower.contains("youtube.com/watch")
            || url_lower.contains("youtu.be/")
            || url_lower.contains("youtube.com/embed/")
            || url_lower.contains("youtube.com/shorts/")
            || url_lower.contains("youtube.com/live/")
            || url_lower.contains("youtube.com/v/")
            || url_lower.contains("m.youtube.com/")
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}
