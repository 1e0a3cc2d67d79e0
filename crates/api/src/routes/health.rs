//! Service status routes

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "tideguard-api";

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: String,
    pub classifier: &'static str,
    pub zones: usize,
    pub history_records: usize,
    pub telemetry_subscribers: usize,
    pub uptime_seconds: u64,
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "ok": true, "service": SERVICE_NAME }))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let context = &state.context;

    Json(HealthResponse {
        status: "OK",
        message: "TideGuard Backend is running",
        version: state.version.clone(),
        classifier: context.classifier_mode().as_str(),
        zones: context.zones().len(),
        history_records: context.history().len(),
        telemetry_subscribers: state
            .telemetry
            .as_ref()
            .map_or(0, |broadcaster| broadcaster.subscriber_count()),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// `GET /metrics`: Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "metrics recorder not installed" })),
        )
            .into_response(),
    }
}
