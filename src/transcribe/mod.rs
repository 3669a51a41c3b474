use anyhow::Result;

use crate::config::Config;
use crate::extractors::{FetchRequest, SourceRegistry};
use crate::output::TranscriptArtifact;

pub mod processor;

pub use processor::{ProcessedTranscript, TranscriptProcessor};

/// Main transcript pipeline: fetch, select, parse, clean, convert
pub struct TranscriptPipeline {
    config: Config,
    registry: SourceRegistry,
    processor: TranscriptProcessor,
}

impl TranscriptPipeline {
    /// Create a pipeline with the default caption sources
    pub fn new(config: Config, show_progress: bool) -> Result<Self> {
        let registry = SourceRegistry::from_config(&config, show_progress)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a pipeline over a custom set of caption sources
    pub fn with_registry(config: Config, registry: SourceRegistry) -> Self {
        let processor = TranscriptProcessor::from_config(&config.captions);
        Self {
            config,
            registry,
            processor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Build the transcript document for a URL or local path.
    ///
    /// Missing or unusable captions do not fail the run; the transcript fields of the
    /// document are left empty instead.
    pub async fn run(&self, input: &str) -> Result<TranscriptArtifact> {
        let request = FetchRequest {
            languages: self.config.captions.preferred_languages.clone(),
        };

        tracing::info!("Fetching captions for: {}", input);
        let media = self.registry.fetch_captions(input, &request).await?;

        let processed = match self.processor.process(&media.tracks) {
            Ok(processed) => {
                tracing::info!(
                    "Transcript ready: {} cues, {} language",
                    processed.transcript.len(),
                    processed.language
                );
                Some(processed)
            }
            Err(e) => {
                tracing::warn!("No usable transcript for {}: {}", input, e);
                None
            }
        };

        Ok(TranscriptArtifact::new(
            input,
            media.metadata,
            processed.as_ref(),
            self.config.app.include_dump,
        ))
    }
}
