use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    // Request validation
    #[error("The \"text\" field is missing.")]
    MissingText,

    // Configuration
    #[error("Invalid configuration for {key}: {message}")]
    Config { key: String, message: String },

    // Artifact loading
    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Invalid artifact format: {0}")]
    ArtifactFormat(String),

    #[error("Artifact lacks a required capability: {0}")]
    Capability(String),

    // Network/Download
    #[error("Download failed: {0}")]
    Download(String),

    // Preprocessing
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    // Inference
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, SentimentError>;

impl SentimentError {
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        SentimentError::Config {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Whether the caller sent something unusable, as opposed to the service failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SentimentError::MissingText)
    }
}

impl From<reqwest::Error> for SentimentError {
    fn from(value: reqwest::Error) -> Self {
        SentimentError::Download(value.to_string())
    }
}

impl From<hf_hub::api::tokio::ApiError> for SentimentError {
    fn from(value: hf_hub::api::tokio::ApiError) -> Self {
        SentimentError::Download(value.to_string())
    }
}

impl From<tokio::task::JoinError> for SentimentError {
    fn from(value: tokio::task::JoinError) -> Self {
        SentimentError::Inference(format!("blocking task did not complete: {value}"))
    }
}
