use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::state::AppState;
use crate::core::cache::SlotState;
use crate::pipelines::sentiment::Prediction;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Characters of the input echoed in prediction logs.
const LOG_PREVIEW_CHARS: usize = 30;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Bad Buzz Detection API is running.",
    })
}

pub async fn ui() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let unhealthy = |reason: String| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                reason: Some(reason),
            }),
        )
    };
    match state.slot_state() {
        SlotState::Ready => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                reason: None,
            }),
        ),
        SlotState::Pending => unhealthy("model artifact not loaded yet".to_string()),
        SlotState::Failed(reason) => unhealthy(reason),
    }
}

/// Pull a non-empty `text` string out of a request body.
pub fn extract_text(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MalformedBody)?;
    let Value::Object(mut fields) = value else {
        return Err(ApiError::MalformedBody);
    };
    match fields.remove("text") {
        None | Some(Value::Null) => Err(ApiError::MissingText),
        Some(Value::String(text)) if text.is_empty() => Err(ApiError::MissingText),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(ApiError::MalformedBody),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Prediction>, ApiError> {
    let text = extract_text(&body).inspect_err(|e| {
        tracing::warn!(reason = ?e, "rejected prediction request");
    })?;

    let pipeline = state.pipeline().await?;
    let (text, result) = tokio::task::spawn_blocking(move || {
        let result = pipeline.predict(&text);
        (text, result)
    })
    .await
    .map_err(|e| ApiError::Internal(e.into()))?;
    let prediction = result?;

    tracing::info!(
        text = %preview(&text),
        label = %prediction.prediction,
        score = %format!("{:.4}", prediction.confidence_score),
        "prediction"
    );
    Ok(Json(prediction))
}
