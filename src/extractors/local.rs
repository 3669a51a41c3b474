use async_trait::async_trait;
use serde_json::json;
use std::path::Path;

use super::{collect_tracks, read_track, CaptionSource, FetchRequest, FetchedMedia, VideoMetadata};
use crate::captions::TrackMap;
use crate::{CaptionError, Result};

/// Caption files already on disk: a single file, or a directory of `<name>.<lang>.<ext>` files
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    /// Check if the path exists and is readable
    async fn validate_path(&self, path: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| CaptionError::FileError(format!("cannot access {}: {}", path.display(), e)))?;

        if metadata.is_file() && metadata.len() == 0 {
            return Err(CaptionError::FileError(format!("file is empty: {}", path.display())).into());
        }

        Ok(())
    }

    fn metadata_for(path: &Path) -> VideoMetadata {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|stem| stem.split('.').find(|part| !part.is_empty()))
            .map(|name| name.to_string());

        VideoMetadata {
            id: name.clone(),
            title: name,
            raw: json!({ "source": path.display().to_string() }),
            ..VideoMetadata::default()
        }
    }
}

#[async_trait]
impl CaptionSource for LocalSource {
    async fn fetch_captions(&self, input: &str, _request: &FetchRequest) -> Result<FetchedMedia> {
        let path = Path::new(input);
        self.validate_path(path).await?;

        let tracks = if path.is_dir() {
            collect_tracks(path, None)?
        } else {
            let track = read_track(path, None, None)?;
            let mut tracks = TrackMap::new();
            tracks.insert(track.language.clone(), vec![track]);
            tracks
        };

        tracing::info!("Loaded captions in {} language(s) from {}", tracks.len(), path.display());

        Ok(FetchedMedia {
            metadata: Self::metadata_for(path),
            tracks,
        })
    }

    fn supports_url(&self, url: &str) -> bool {
        Path::new(url).exists()
    }

    fn platform_name(&self) -> &'static str {
        "Local caption files"
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::Dialect;

    #[tokio::test]
    async fn test_fetch_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.de.srt");
        fs_err::write(&path, "1\n00:00:00,000 --> 00:00:01,000\nHallo\n").unwrap();

        let media = LocalSource::new()
            .fetch_captions(path.to_str().unwrap(), &FetchRequest::default())
            .await
            .unwrap();

        assert_eq!(media.metadata.id.as_deref(), Some("lecture"));
        assert_eq!(media.tracks["de"][0].dialect, Dialect::Srt);
    }

    #[tokio::test]
    async fn test_fetch_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("talk.en.vtt"), "WEBVTT\n\n00:00.000 --> 00:01.000\nHi\n").unwrap();
        fs_err::write(dir.path().join("talk.es.srt"), "1\n00:00:00,000 --> 00:00:01,000\nHola\n").unwrap();

        let media = LocalSource::new()
            .fetch_captions(dir.path().to_str().unwrap(), &FetchRequest::default())
            .await
            .unwrap();

        assert_eq!(media.tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.srt");
        fs_err::write(&path, "").unwrap();

        let result = LocalSource::new()
            .fetch_captions(path.to_str().unwrap(), &FetchRequest::default())
            .await;

        assert!(result.is_err());
    }
}
