//! Sentiment model artifacts.
//!
//! Every artifact family implements [`SentimentModel`]: turn text into the
//! input the model expects, then score that input. The families differ only
//! in where preprocessing lives and what shape of score comes back.

use std::fmt;
use std::str::FromStr;

use crate::core::error::{Result, SentimentError};
use crate::preprocessing::SparseVector;

pub mod linear;
pub mod logistic;
pub mod sequence;

pub use linear::{SplitLinearModel, TfidfPipelineModel};
pub use logistic::LogisticRegression;
pub use sequence::{SequenceClassifier, SequenceConfig};

/// Serialized artifact layouts this service can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFamily {
    /// One file bundling the vectorizer and the classifier.
    Pipeline,
    /// Classifier and vectorizer stored as separate files.
    Vectorizer,
    /// Neural sequence classifier with its own tokenizer.
    Sequence,
}

impl ArtifactFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFamily::Pipeline => "pipeline",
            ArtifactFamily::Vectorizer => "vectorizer",
            ArtifactFamily::Sequence => "sequence",
        }
    }
}

impl fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pipeline" => Ok(ArtifactFamily::Pipeline),
            "vectorizer" => Ok(ArtifactFamily::Vectorizer),
            "sequence" => Ok(ArtifactFamily::Sequence),
            other => Err(format!(
                "expected `pipeline`, `vectorizer` or `sequence`, got `{other}`"
            )),
        }
    }
}

/// Model input produced by [`SentimentModel::preprocess`].
#[derive(Debug, Clone, PartialEq)]
pub enum Features {
    /// Raw text, for artifacts that vectorize internally.
    Text(String),
    Sparse(SparseVector),
    /// Fixed-length token ids.
    Sequence(Vec<u32>),
}

impl Features {
    pub fn kind(&self) -> &'static str {
        match self {
            Features::Text(_) => "text",
            Features::Sparse(_) => "sparse",
            Features::Sequence(_) => "sequence",
        }
    }
}

/// Unthresholded model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore {
    /// `[p(negative), p(positive)]`.
    Probabilities([f32; 2]),
    /// A single sigmoid output whose polarity depends on the artifact.
    Scalar(f32),
}

/// Trait that every loadable artifact implements.
///
/// Implementations are immutable after loading and shared across requests.
pub trait SentimentModel: Send + Sync {
    fn family(&self) -> ArtifactFamily;

    fn preprocess(&self, text: &str) -> Result<Features>;

    fn score(&self, features: &Features) -> Result<RawScore>;
}

pub(crate) fn unexpected_features(family: ArtifactFamily, features: &Features) -> SentimentError {
    SentimentError::Inference(format!(
        "{family} model cannot score {} features",
        features.kind()
    ))
}
