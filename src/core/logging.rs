use tracing_subscriber::EnvFilter;

use crate::core::error::{Result, SentimentError};

/// Install the global `tracing` subscriber using an explicit filter directive.
///
/// Call once, after the configuration has been read.
pub fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| SentimentError::config("BADBUZZ_LOG", e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| SentimentError::config("BADBUZZ_LOG", e.to_string()))
}
