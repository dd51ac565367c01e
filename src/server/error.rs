use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::error::SentimentError;

pub const MISSING_TEXT: &str = "The \"text\" field is missing.";
pub const MALFORMED_BODY: &str = "The request body must be a JSON object.";
pub const INTERNAL_ERROR: &str = "An internal error occurred.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Failure of a `/predict` request as seen by the client.
#[derive(Debug)]
pub enum ApiError {
    MissingText,
    MalformedBody,
    /// Details are logged when the response is built and never sent.
    Internal(SentimentError),
}

impl From<SentimentError> for ApiError {
    fn from(value: SentimentError) -> Self {
        if value.is_client_error() {
            ApiError::MissingText
        } else {
            ApiError::Internal(value)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::MissingText => (StatusCode::BAD_REQUEST, MISSING_TEXT),
            ApiError::MalformedBody => (StatusCode::BAD_REQUEST, MALFORMED_BODY),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_text_maps_to_a_client_error() {
        assert!(matches!(
            ApiError::from(SentimentError::MissingText),
            ApiError::MissingText
        ));
        assert!(matches!(
            ApiError::from(SentimentError::Inference("nan".to_string())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::MalformedBody.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(SentimentError::ModelUnavailable("gone".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
