#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use badbuzz::models::{ArtifactFamily, Features, RawScore, SentimentModel};
use badbuzz::server::{router, AppState};
use badbuzz::Result;

/// Model returning a fixed score and counting how often it is used.
pub struct StubModel {
    pub raw: RawScore,
    pub calls: Arc<AtomicUsize>,
}

impl StubModel {
    pub fn new(raw: RawScore) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                raw,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl SentimentModel for StubModel {
    fn family(&self) -> ArtifactFamily {
        match self.raw {
            RawScore::Probabilities(_) => ArtifactFamily::Pipeline,
            RawScore::Scalar(_) => ArtifactFamily::Sequence,
        }
    }

    fn preprocess(&self, text: &str) -> Result<Features> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Features::Text(text.to_string()))
    }

    fn score(&self, _features: &Features) -> Result<RawScore> {
        Ok(self.raw)
    }
}

/// Start the service on an ephemeral port and return its base URL.
pub async fn spawn_server(state: AppState) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    Ok(format!("http://{addr}"))
}

/// Serve `body` at `/<name>` from a throwaway HTTP server.
pub async fn spawn_file_server(name: &str, body: Vec<u8>) -> anyhow::Result<String> {
    let (base, _) = spawn_slow_file_server(name, body, Duration::ZERO).await?;
    Ok(base)
}

/// Like [`spawn_file_server`], answering after `delay` and counting requests.
pub async fn spawn_slow_file_server(
    name: &str,
    body: Vec<u8>,
    delay: Duration,
) -> anyhow::Result<(String, Arc<AtomicUsize>)> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = axum::Router::new().route(
        &format!("/{name}"),
        axum::routing::get(move || {
            let body = body.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                body
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), hits))
}

/// Bundled TF-IDF pipeline where "love"/"great" push positive and "hate"/"awful" negative.
pub fn pipeline_json() -> serde_json::Value {
    serde_json::json!({
        "vectorizer": vectorizer_json(),
        "classifier": classifier_json()
    })
}

pub fn vectorizer_json() -> serde_json::Value {
    serde_json::json!({
        "vocabulary": {"love": 0, "great": 1, "hate": 2, "awful": 3, "flight": 4},
        "idf": [1.5, 1.5, 1.5, 1.5, 1.0],
        "ngram_range": [1, 1],
        "norm": "l2"
    })
}

pub fn classifier_json() -> serde_json::Value {
    serde_json::json!({
        "coef": [4.0, 4.0, -4.0, -4.0, 0.0],
        "intercept": 0.0,
        "classes": [0, 1]
    })
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

pub fn tokenizer_json() -> serde_json::Value {
    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {"type": "Lowercase"},
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"<pad>": 0, "<unk>": 1, "love": 2, "hate": 3},
            "unk_token": "<unk>"
        }
    })
}
