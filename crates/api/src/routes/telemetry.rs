//! Live telemetry WebSocket
//!
//! Frames are JSON objects `{"event": ..., "data": ...}`. Clients receive a
//! `connected` greeting, then every `weather_data` reading. Sending the text
//! `request_data` asks for an immediate reading.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use telemetry::{TelemetryBroadcaster, TelemetryReading};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::AppState;

/// Client request for an immediate reading
const REQUEST_DATA: &str = "request_data";

/// Server-to-client frame
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TelemetryEvent {
    Connected { data: String },
    WeatherData(TelemetryReading),
}

impl TelemetryEvent {
    pub fn connected() -> Self {
        TelemetryEvent::Connected {
            data: "Connected to TideGuard Backend".to_string(),
        }
    }
}

/// `GET /ws/telemetry`
pub async fn telemetry_socket(
    State(state): State<Arc<AppState>>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let Some(broadcaster) = state.telemetry.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "telemetry disabled" })),
        )
            .into_response();
    };

    let Some(ws) = ws else {
        return (
            StatusCode::UPGRADE_REQUIRED,
            Json(json!({ "error": "websocket upgrade required" })),
        )
            .into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<TelemetryBroadcaster>) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = broadcaster.subscribe();
    info!(
        "Telemetry client connected ({} subscribers)",
        broadcaster.subscriber_count()
    );

    if send_event(&mut sender, &TelemetryEvent::connected()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(reading) => {
                    if send_event(&mut sender, &TelemetryEvent::WeatherData(reading)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Telemetry client lagging, skipped {} readings", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) if is_data_request(&text) => {
                    let reading = broadcaster.sample().await;
                    if send_event(&mut sender, &TelemetryEvent::WeatherData(reading)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Text(text))) => debug!("Ignoring telemetry client message: {}", text),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Telemetry socket error: {}", e);
                    break;
                }
            },
        }
    }

    info!("Telemetry client disconnected");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &TelemetryEvent,
) -> Result<(), axum::Error> {
    let frame = match serde_json::to_string(event) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode telemetry event: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(frame)).await
}

/// Plain `request_data` or a JSON frame `{"event": "request_data"}`
fn is_data_request(text: &str) -> bool {
    let text = text.trim();
    if text == REQUEST_DATA {
        return true;
    }
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|frame| frame.get("event").and_then(Value::as_str).map(|e| e == REQUEST_DATA))
        .unwrap_or(false)
}
