use std::sync::Arc;

use crate::core::cache::{ArtifactSlot, SlotState};
use crate::core::error::{Result, SentimentError};
use crate::pipelines::sentiment::{SentimentPipeline, SentimentPipelineBuilder};

/// Shared handler state: the artifact slot and, in lazy mode, how to fill it.
#[derive(Clone)]
pub struct AppState {
    slot: Arc<ArtifactSlot<SentimentPipeline>>,
    loader: Option<SentimentPipelineBuilder>,
}

impl AppState {
    /// State around a pipeline that is already loaded.
    pub fn ready(pipeline: SentimentPipeline) -> Self {
        Self {
            slot: Arc::new(ArtifactSlot::ready(pipeline)),
            loader: None,
        }
    }

    /// State that loads the artifact on the first prediction request.
    pub fn lazy(builder: SentimentPipelineBuilder) -> Self {
        Self {
            slot: Arc::new(ArtifactSlot::new()),
            loader: Some(builder),
        }
    }

    pub fn slot_state(&self) -> SlotState {
        self.slot.state()
    }

    /// The loaded pipeline, loading it first if this is a lazy state.
    pub async fn pipeline(&self) -> Result<Arc<SentimentPipeline>> {
        if let Some(pipeline) = self.slot.get() {
            return Ok(pipeline);
        }
        let builder = self.loader.clone().ok_or_else(|| {
            SentimentError::ModelUnavailable("no artifact loader configured".to_string())
        })?;
        self.slot
            .get_or_load(|| async move {
                tracing::info!(family = %builder.family(), "loading artifact on first request");
                builder.build().await.inspect_err(|e| {
                    tracing::error!(error = %e, "lazy artifact load failed");
                })
            })
            .await
    }
}
