use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use url::Url;

use crate::captions::Dialect;

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid slug regex"));

/// File name used when a URL slugifies to nothing
pub const DEFAULT_OUTPUT_FILE: &str = "out.json";

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Turn a URL into a file-name-safe slug
pub fn slugify_url(url: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(url, "_")
        .trim_matches('_')
        .to_string()
}

/// Default location of the transcript document for `url`
pub fn default_output_path(output_dir: &Path, url: &str) -> PathBuf {
    let slug = slugify_url(url);
    if slug.is_empty() {
        output_dir.join(DEFAULT_OUTPUT_FILE)
    } else {
        output_dir.join(format!("{}.json", slug))
    }
}

/// Where converted captions go: `output` itself, or `<input stem>.<ext>` inside it when
/// it is a directory
pub fn converted_output_path(input: &Path, output: &Path, to: Dialect) -> PathBuf {
    if !output.is_dir() {
        return output.to_path_buf();
    }

    let mut name = input
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "captions".into());
    name.push(".");
    name.push(to.extension());
    output.join(name)
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required for fetching video metadata and captions", yt_dlp_path));
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_slugify_url() {
        assert_eq!(
            slugify_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https_www_youtube_com_watch_v_dQw4w9WgXcQ"
        );
        assert_eq!(slugify_url("///"), "");
    }

    #[test]
    fn test_default_output_path() {
        let dir = Path::new("outputs");
        assert_eq!(
            default_output_path(dir, "https://youtu.be/abc"),
            PathBuf::from("outputs/https_youtu_be_abc.json")
        );
        assert_eq!(default_output_path(dir, "::"), PathBuf::from("outputs/out.json"));
    }

    #[test]
    fn test_converted_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = Path::new("talks/keynote.en.vtt");

        assert_eq!(
            converted_output_path(input, dir.path(), Dialect::Srt),
            dir.path().join("keynote.en.srt")
        );
        assert_eq!(
            converted_output_path(input, &dir.path().join("named.txt"), Dialect::Srt),
            dir.path().join("named.txt")
        );
    }

    #[test]
    fn test_validate_and_normalize_url() {
        assert!(validate_and_normalize_url("https://example.com").is_ok());
        assert!(validate_and_normalize_url("http://example.com").is_ok());
        assert!(validate_and_normalize_url("ftp://example.com").is_err());
        assert!(validate_and_normalize_url("not-a-url").is_err());
    }

    #[tokio::test]
    async fn test_missing_command_is_reported() {
        let missing = check_dependencies("definitely-not-a-real-binary-4821").await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("definitely-not-a-real-binary-4821"));
    }
}
