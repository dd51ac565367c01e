use anyhow::{Context, Result};
use badbuzz::core::{init_logging, LoadMode, ServiceConfig};
use badbuzz::pipelines::sentiment::SentimentPipelineBuilder;
use badbuzz::server::{self, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env().context("invalid configuration")?;
    init_logging(&config.log_filter)?;

    let builder = SentimentPipelineBuilder::new(config.artifacts.clone()).warmup(config.warmup);
    let state = match config.load_mode {
        LoadMode::Eager => {
            let pipeline = builder
                .build()
                .await
                .context("failed to load the sentiment artifact")?;
            AppState::ready(pipeline)
        }
        LoadMode::Lazy => {
            tracing::info!("artifact will be loaded on the first prediction request");
            AppState::lazy(builder)
        }
    };

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    server::serve(listener, state).await?;
    Ok(())
}
