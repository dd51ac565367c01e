//! Sentiment classification service for short social-media texts.
//!
//! A trained artifact is loaded once and served over HTTP: `POST /predict`
//! returns a `Positive`/`Negative` label with the raw model score.

pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod preprocessing;
pub mod server;

pub use crate::core::{ArtifactConfig, LoadMode, Result, SentimentError, ServiceConfig};
pub use models::{ArtifactFamily, SentimentModel};
pub use pipelines::sentiment::{
    Label, Polarity, Prediction, SentimentPipeline, SentimentPipelineBuilder,
};
