use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub mod cookies;
pub mod local;
pub mod youtube;

pub use cookies::CookieJar;

use crate::captions::{CaptionTrack, Dialect, TrackMap};
use crate::config::Config;
use crate::{CaptionError, Result};

/// Extensions of caption files worth reading
const CAPTION_EXTENSIONS: &[&str] = &["srt", "vtt", "ttml", "dfxp", "srv1", "srv2", "srv3", "txt"];

/// Language used when a track's language cannot be determined
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Video metadata as reported by the extraction tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,

    /// Duration in seconds
    pub duration: Option<f64>,
    pub view_count: Option<u64>,

    /// Upload date as `YYYYMMDD`
    pub upload_date: Option<String>,
    pub thumbnail: Option<String>,

    /// Full metadata dump
    pub raw: Value,
}

impl VideoMetadata {
    /// Pull the fields we care about out of a yt-dlp info dictionary
    pub fn from_info(info: Value) -> Self {
        let text = |key: &str| info[key].as_str().map(|s| s.to_string());

        Self {
            id: text("id"),
            title: text("title"),
            description: text("description"),
            channel: text("channel").or_else(|| text("uploader")),
            channel_id: text("channel_id").or_else(|| text("uploader_id")),
            duration: info["duration"].as_f64(),
            view_count: info["view_count"].as_u64(),
            upload_date: text("upload_date"),
            thumbnail: text("thumbnail"),
            raw: info,
        }
    }

    /// Best thumbnail URL, falling back to the platform's max resolution image
    pub fn best_thumbnail(&self) -> Option<String> {
        self.thumbnail
            .clone()
            .or_else(|| self.id.as_ref().map(|id| format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", id)))
    }
}

/// What to fetch
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Language preference patterns, most preferred first
    pub languages: Vec<String>,
}

/// Metadata and every caption track found for one video
#[derive(Debug, Clone, Default)]
pub struct FetchedMedia {
    pub metadata: VideoMetadata,
    pub tracks: TrackMap,
}

/// Trait for fetching captions from different platforms
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch metadata and caption tracks for an input
    async fn fetch_captions(&self, input: &str, request: &FetchRequest) -> Result<FetchedMedia>;

    /// Check if this source supports the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

/// Registry for managing multiple caption sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn CaptionSource>>,
    local: local::LocalSource,
}

impl SourceRegistry {
    /// Create an empty registry that only handles local files
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            local: local::LocalSource::new(),
        }
    }

    /// Create a registry with the default sources
    pub fn from_config(config: &Config, show_progress: bool) -> Result<Self> {
        let extractor = &config.extractor;
        let cookies = CookieJar::from_env(&extractor.cookies_env)?;
        if cookies.is_some() {
            tracing::info!("Using cookies from ${}", extractor.cookies_env);
        }

        let mut youtube = youtube::YoutubeSource::new(&extractor.yt_dlp_path).with_progress(show_progress);
        if let Some(cookies) = cookies {
            youtube = youtube.with_cookies(cookies);
        }
        if let Some(dir) = &config.app.temp_dir {
            youtube = youtube.with_temp_root(dir.clone());
        }

        let mut registry = Self::new();
        registry.register(Box::new(youtube));
        Ok(registry)
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn CaptionSource>) {
        self.sources.push(source);
    }

    /// Find a source that supports the given URL
    pub fn find_source(&self, url: &str) -> Option<&dyn CaptionSource> {
        self.sources
            .iter()
            .find(|source| source.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported platforms
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .map(|source| source.platform_name())
            .chain(std::iter::once(self.local.platform_name()))
            .collect()
    }

    /// Check if input is a local file path
    pub fn is_local_file(&self, input: &str) -> bool {
        if input.starts_with("http://") || input.starts_with("https://") {
            return false;
        }

        Path::new(input).exists()
    }

    /// Fetch captions using the appropriate source
    pub async fn fetch_captions(&self, input: &str, request: &FetchRequest) -> Result<FetchedMedia> {
        if self.is_local_file(input) {
            return self.local.fetch_captions(input, request).await;
        }

        let source = self
            .find_source(input)
            .ok_or_else(|| CaptionError::UnsupportedUrl(input.to_string()))?;

        tracing::debug!("Using {} source for {}", source.platform_name(), input);
        source.fetch_captions(input, request).await
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Guess the language from a `<name>.<lang>.<ext>` file name
pub fn language_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (_, language) = stem.rsplit_once('.')?;
    looks_like_language(language).then(|| language.to_string())
}

fn looks_like_language(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= 35
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Read one caption file into a track
pub fn read_track(path: &Path, dialect: Option<Dialect>, language: Option<&str>) -> Result<CaptionTrack> {
    let bytes = fs_err::read(path).map_err(|e| CaptionError::FileError(e.to_string()))?;
    let payload = String::from_utf8_lossy(&bytes).into_owned();

    let dialect = dialect.unwrap_or_else(|| Dialect::from_path(path));
    let language = language
        .map(|l| l.to_string())
        .or_else(|| language_from_filename(path))
        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string());

    Ok(CaptionTrack::new(language, dialect, payload))
}

/// Collect caption files from a directory into a track map.
///
/// With a `video_id`, only files named `<video_id>.<lang>.<ext>` are considered, which is
/// how yt-dlp names subtitles it writes.
pub fn collect_tracks(dir: &Path, video_id: Option<&str>) -> Result<TrackMap> {
    let mut paths = Vec::new();
    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_caption_file(&path, video_id) {
            paths.push(path);
        }
    }
    // Directory order is platform dependent
    paths.sort();

    let mut tracks = TrackMap::new();
    for path in paths {
        let track = read_track(&path, None, None)?;
        tracing::debug!("Found {} captions in {} ({})", track.language, path.display(), track.dialect);
        tracks.entry(track.language.clone()).or_default().push(track);
    }

    Ok(tracks)
}

fn is_caption_file(path: &Path, video_id: Option<&str>) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    let has_caption_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CAPTION_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    let belongs_to_video = video_id
        .map(|id| name.starts_with(&format!("{}.", id)))
        .unwrap_or(true);

    has_caption_extension && belongs_to_video
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_info_with_fallbacks() {
        let metadata = VideoMetadata::from_info(json!({
            "id": "abc123",
            "title": "A title",
            "uploader": "Someone",
            "uploader_id": "@someone",
            "duration": 61,
            "view_count": 42,
            "upload_date": "20240102",
        }));

        assert_eq!(metadata.channel.as_deref(), Some("Someone"));
        assert_eq!(metadata.channel_id.as_deref(), Some("@someone"));
        assert_eq!(metadata.duration, Some(61.0));
        assert_eq!(metadata.view_count, Some(42));
        assert_eq!(
            metadata.best_thumbnail().as_deref(),
            Some("https://i.ytimg.com/vi/abc123/maxresdefault.jpg")
        );
        assert_eq!(metadata.raw["title"], "A title");
    }

    #[test]
    fn test_best_thumbnail_prefers_reported_one() {
        let metadata = VideoMetadata::from_info(json!({ "id": "x", "thumbnail": "https://img/x.jpg" }));
        assert_eq!(metadata.best_thumbnail().as_deref(), Some("https://img/x.jpg"));

        assert_eq!(VideoMetadata::default().best_thumbnail(), None);
    }

    #[test]
    fn test_language_from_filename() {
        assert_eq!(language_from_filename(Path::new("abc.fr.srt")).as_deref(), Some("fr"));
        assert_eq!(language_from_filename(Path::new("dir/abc.en-US.vtt")).as_deref(), Some("en-US"));
        assert_eq!(language_from_filename(Path::new("abc.srt")), None);
        assert_eq!(language_from_filename(Path::new("my talk.final draft.srt")), None);
    }

    #[test]
    fn test_collect_tracks_groups_by_language() {
        let dir = tempfile::tempdir().unwrap();
        let cue = "1\n00:00:00,000 --> 00:00:01,000\nHello\n";
        fs_err::write(dir.path().join("vid.fr.vtt"), "WEBVTT\n\n00:00.000 --> 00:01.000\nSalut\n").unwrap();
        fs_err::write(dir.path().join("vid.fr.srt"), cue).unwrap();
        fs_err::write(dir.path().join("vid.en.srt"), cue).unwrap();
        fs_err::write(dir.path().join("other.de.srt"), cue).unwrap();
        fs_err::write(dir.path().join("vid.info.json"), "{}").unwrap();

        let tracks = collect_tracks(dir.path(), Some("vid")).unwrap();

        assert_eq!(tracks.keys().collect::<Vec<_>>(), vec!["en", "fr"]);
        let fr: Vec<Dialect> = tracks["fr"].iter().map(|t| t.dialect).collect();
        assert_eq!(fr, vec![Dialect::Srt, Dialect::Vtt]);

        let all = collect_tracks(dir.path(), None).unwrap();
        assert!(all.contains_key("de"));
    }

    #[test]
    fn test_read_track_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.captions");
        fs_err::write(&path, "WEBVTT\n").unwrap();

        let guessed = read_track(&path, None, None).unwrap();
        assert_eq!(guessed.language, UNDETERMINED_LANGUAGE);
        assert_eq!(guessed.dialect, Dialect::Unknown);

        let forced = read_track(&path, Some(Dialect::Vtt), Some("de")).unwrap();
        assert_eq!(forced.language, "de");
        assert_eq!(forced.dialect, Dialect::Vtt);
    }

    #[tokio::test]
    async fn test_registry_rejects_unsupported_url() {
        let registry = SourceRegistry::new();
        let err = registry
            .fetch_captions("https://example.com/video", &FetchRequest::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.downcast_ref::<CaptionError>(),
            Some(&CaptionError::UnsupportedUrl("https://example.com/video".to_string()))
        );
    }
}
