use std::sync::Arc;

use crate::core::error::{Result, SentimentError};
use crate::models::{ArtifactFamily, SentimentModel};

use super::decision::{decide, Polarity, Prediction};

/// Fixed sentence scored once after loading to surface broken artifacts early.
pub const WARMUP_TEXT: &str = "Ceci est un texte de test.";

/// A loaded artifact together with the rule that labels its output.
#[derive(Clone)]
pub struct SentimentPipeline {
    pub(crate) model: Arc<dyn SentimentModel>,
    pub(crate) polarity: Polarity,
}

impl std::fmt::Debug for SentimentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentPipeline")
            .field("family", &self.model.family())
            .field("polarity", &self.polarity)
            .finish_non_exhaustive()
    }
}

impl SentimentPipeline {
    pub fn new<M: SentimentModel + 'static>(model: M, polarity: Polarity) -> Self {
        Self {
            model: Arc::new(model),
            polarity,
        }
    }

    pub fn family(&self) -> ArtifactFamily {
        self.model.family()
    }

    /// Classify one text. Blocking; call from a blocking-capable thread.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        if text.is_empty() {
            return Err(SentimentError::MissingText);
        }
        let _enter = tracing::span!(
            tracing::Level::DEBUG,
            "predict",
            family = %self.model.family(),
            chars = text.chars().count()
        )
        .entered();

        let features = self.model.preprocess(text)?;
        let raw = self.model.score(&features)?;
        tracing::debug!(?raw, "raw score");
        decide(raw, self.polarity)
    }

    /// Run one throwaway prediction and discard the result.
    pub fn warm_up(&self) -> Result<()> {
        let prediction = self.predict(WARMUP_TEXT)?;
        tracing::debug!(
            label = %prediction.prediction,
            score = prediction.confidence_score,
            "warm-up prediction"
        );
        Ok(())
    }
}
