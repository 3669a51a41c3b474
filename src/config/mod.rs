use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::captions::Dialect;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Caption selection and storage
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Extraction tool settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Language patterns, most preferred first
    pub preferred_languages: Vec<String>,

    /// Dialect the raw captions are stored in; `None` keeps the payload as fetched
    pub storage_dialect: Option<Dialect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Environment variable holding base64 encoded cookies
    pub cookies_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for generated transcript files
    pub output_dir: PathBuf,

    /// Temporary directory for downloaded captions
    pub temp_dir: Option<PathBuf>,

    /// Embed the full metadata dump in the output
    pub include_dump: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            preferred_languages: ["fr", "fr.*", "en", "en.*", "de", "es", "*"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            storage_dialect: Some(Dialect::Srt),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            cookies_env: "COOKIES_B64".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            temp_dir: None,
            include_dump: true,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("caption-scribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.captions.preferred_languages.is_empty() {
            anyhow::bail!("At least one preferred language must be configured");
        }

        if let Some(blank) = self
            .captions
            .preferred_languages
            .iter()
            .position(|pattern| pattern.trim().is_empty())
        {
            anyhow::bail!("Preferred language #{} is empty", blank + 1);
        }

        if self.extractor.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("yt-dlp path must not be empty");
        }

        Ok(())
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, languages: Vec<String>, storage_dialect: Option<Dialect>, include_dump: Option<bool>) -> Result<Self> {
        if !languages.is_empty() {
            self.captions.preferred_languages = languages;
        }
        if storage_dialect.is_some() {
            self.captions.storage_dialect = storage_dialect;
        }
        if let Some(include_dump) = include_dump {
            self.app.include_dump = include_dump;
        }

        self.validate()?;
        Ok(self)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Preferred languages: {}", self.captions.preferred_languages.join(", "));
        match self.captions.storage_dialect {
            Some(dialect) => println!("  Stored caption dialect: {}", dialect),
            None => println!("  Stored caption dialect: as fetched"),
        }
        println!("  yt-dlp: {}", self.extractor.yt_dlp_path);
        println!("  Cookies variable: ${}", self.extractor.cookies_env);
        println!("  Output directory: {}", self.app.output_dir.display());
        if let Some(dir) = &self.app.temp_dir {
            println!("  Temp directory: {}", dir.display());
        }
        println!("  Include metadata dump: {}", self.app.include_dump);
    }
}
