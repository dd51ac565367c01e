use std::path::PathBuf;
use std::time::Instant;

use tokenizers::Tokenizer;

use super::decision::Polarity;
use super::pipeline::SentimentPipeline;
use crate::core::config::ArtifactConfig;
use crate::core::error::{Result, SentimentError};
use crate::models::{
    ArtifactFamily, SequenceClassifier, SequenceConfig, SplitLinearModel, TfidfPipelineModel,
};
use crate::pipelines::utils::DeviceRequest;

/// Local copies of every file a family needs.
enum ResolvedFiles {
    Pipeline {
        model: PathBuf,
    },
    Vectorizer {
        model: PathBuf,
        vectorizer: PathBuf,
    },
    Sequence {
        weights: PathBuf,
        config: PathBuf,
        tokenizer: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct SentimentPipelineBuilder {
    artifacts: ArtifactConfig,
    warmup: bool,
}

impl SentimentPipelineBuilder {
    pub fn new(artifacts: ArtifactConfig) -> Self {
        Self {
            artifacts,
            warmup: true,
        }
    }

    /// Score a fixed sentence after loading; a failure fails the build.
    pub fn warmup(mut self, enabled: bool) -> Self {
        self.warmup = enabled;
        self
    }

    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.artifacts.scalar_polarity = polarity;
        self
    }

    pub fn family(&self) -> ArtifactFamily {
        self.artifacts.family
    }

    /// Fetch missing files, deserialize the artifact and optionally warm it up.
    pub async fn build(self) -> Result<SentimentPipeline> {
        let started = Instant::now();
        let family = self.artifacts.family;
        tracing::info!(%family, model = %self.artifacts.model.path.display(), "loading artifact");

        let files = self.resolve_files().await?;
        let device = self.artifacts.device.clone();
        let polarity = self.artifacts.scalar_polarity;
        let warmup = self.warmup;

        let pipeline = tokio::task::spawn_blocking(move || -> Result<SentimentPipeline> {
            let pipeline = load(files, &device, polarity)?;
            if warmup {
                pipeline.warm_up()?;
            }
            Ok(pipeline)
        })
        .await??;

        tracing::info!(
            %family,
            warmup,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "artifact ready"
        );
        Ok(pipeline)
    }

    async fn resolve_files(&self) -> Result<ResolvedFiles> {
        let a = &self.artifacts;
        Ok(match a.family {
            ArtifactFamily::Pipeline => ResolvedFiles::Pipeline {
                model: a.model.ensure_local().await?,
            },
            ArtifactFamily::Vectorizer => ResolvedFiles::Vectorizer {
                model: a.model.ensure_local().await?,
                vectorizer: a.vectorizer.ensure_local().await?,
            },
            ArtifactFamily::Sequence => ResolvedFiles::Sequence {
                weights: a.model.ensure_local().await?,
                config: a.model_config.ensure_local().await?,
                tokenizer: a.tokenizer.ensure_local().await?,
            },
        })
    }
}

fn load(files: ResolvedFiles, device: &DeviceRequest, polarity: Polarity) -> Result<SentimentPipeline> {
    match files {
        ResolvedFiles::Pipeline { model } => Ok(SentimentPipeline::new(
            TfidfPipelineModel::from_file(&model)?,
            polarity,
        )),
        ResolvedFiles::Vectorizer { model, vectorizer } => Ok(SentimentPipeline::new(
            SplitLinearModel::from_files(&model, &vectorizer)?,
            polarity,
        )),
        ResolvedFiles::Sequence {
            weights,
            config,
            tokenizer,
        } => {
            let device = device.resolve()?;
            let config = SequenceConfig::from_file(&config)?;
            let tokenizer = Tokenizer::from_file(&tokenizer).map_err(|e| {
                SentimentError::ArtifactFormat(format!(
                    "failed to load tokenizer {}: {e}",
                    tokenizer.display()
                ))
            })?;
            tracing::debug!(device = ?device.location(), max_len = config.max_len, "sequence model");
            Ok(SentimentPipeline::new(
                SequenceClassifier::load(&weights, config, tokenizer, &device)?,
                polarity,
            ))
        }
    }
}
