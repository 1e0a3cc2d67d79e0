//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::service::PredictionError;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent an unusable request
    #[error("{0}")]
    BadRequest(String),
    /// Prediction pipeline failed
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status_code = status.as_u16(), message = %message, "Request error");
        } else {
            tracing::debug!(status_code = status.as_u16(), message = %message, "Rejected request");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
