//! Sentiment pipeline: load an artifact, score text, apply the threshold.
//!
//! ## Main Types
//!
//! - [`SentimentPipeline`] - a loaded artifact plus its labeling rule
//! - [`SentimentPipelineBuilder`] - resolves, downloads and loads artifacts
//! - [`Prediction`] - label and raw confidence score
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use badbuzz::core::ArtifactConfig;
//! use badbuzz::models::ArtifactFamily;
//! use badbuzz::pipelines::sentiment::SentimentPipelineBuilder;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pipeline = SentimentPipelineBuilder::new(ArtifactConfig::new(ArtifactFamily::Pipeline))
//!     .build()
//!     .await?;
//! let result = pipeline.predict("I love this airline!")?;
//! println!("{} ({:.4})", result.prediction, result.confidence_score);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod decision;
pub mod pipeline;

pub use builder::SentimentPipelineBuilder;
pub use decision::{decide, Label, Polarity, Prediction, THRESHOLD};
pub use pipeline::{SentimentPipeline, WARMUP_TEXT};
