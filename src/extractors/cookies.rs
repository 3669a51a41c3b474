use base64::Engine;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{CaptionError, Result};

/// Cookies handed to the extraction tool for authenticated requests.
///
/// The cookie file lives in a private temporary directory that is removed when the
/// jar is dropped. Its contents are never logged.
pub struct CookieJar {
    _dir: TempDir,
    path: PathBuf,
}

impl CookieJar {
    /// Decode a base64 Netscape cookie file
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| CaptionError::InvalidCredentials(format!("cookies are not valid base64: {}", e)))?;

        let dir = TempDir::new().map_err(|e| CaptionError::FileError(e.to_string()))?;
        let path = dir.path().join("cookies.txt");
        fs_err::write(&path, bytes)?;

        Ok(Self { _dir: dir, path })
    }

    /// Load cookies from an environment variable, if it is set and not empty
    pub fn from_env(var: &str) -> Result<Option<Self>> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Self::from_base64(&value).map(Some),
            _ => Ok(None),
        }
    }

    /// Path of the cookie file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar").field("path", &self.path).finish_non_exhaustive()
    }
}
