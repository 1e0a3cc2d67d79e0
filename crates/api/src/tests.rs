use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use impact::{Zone, ZoneCatalogue};
use inference_engine::SeverityClassifier;
use serde_json::{json, Value};
use storage::HistoryStore;
use tower::ServiceExt;

use crate::config::ServerSettings;

const HISTORY_CSV: &str = "timestamp,water_level_m\n\
    2024-07-15 00:00:00,0.8\n\
    2024-07-15 01:00:00,0.9\n\
    2024-07-15 02:00:00,1.1\n";

fn zones() -> ZoneCatalogue {
    ZoneCatalogue::from_zones(vec![Zone::from_feature(json!({
        "type": "Feature",
        "properties": {"name": "Worli Koliwada", "vulnerability": "low"},
        "geometry": {"type": "Polygon", "coordinates": [[[72.81, 19.0], [72.82, 19.0], [72.82, 19.01], [72.81, 19.0]]]}
    }))])
}

fn router_with(context: HazardContext, history_limit: usize) -> Router {
    let state = Arc::new(AppState::new(context, history_limit));
    create_router(state, &ServerSettings::default(), &RateLimitConfig::default())
}

fn router() -> Router {
    let history = HistoryStore::from_csv_str(HISTORY_CSV, 100).unwrap();
    router_with(
        HazardContext::new(SeverityClassifier::rule_based(), zones(), history),
        200,
    )
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_predict(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root() {
    let (status, body) = send(router(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "service": "tideguard-api"}));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["classifier"], "rule_based");
    assert_eq!(body["zones"], 1);
    assert_eq!(body["history_records"], 3);
    assert_eq!(body["telemetry_subscribers"], 0);
}

#[tokio::test]
async fn test_predict_extreme_surge() {
    let (status, body) = send(
        router(),
        post_predict(r#"{"water_level_m": 2.0, "wind_speed_mps": 4.0, "pressure_hpa": 1008, "tide_predicted_m": 0.85}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], 3);
    assert_eq!(body["confidence"], 0.5);
    assert_eq!(body["affected_areas"]["type"], "FeatureCollection");
    assert_eq!(
        body["affected_areas"]["features"][0]["properties"]["name"],
        "Worli Koliwada"
    );
    assert_eq!(body["effects"][0], "Evacuate low-lying areas.");
}

#[tokio::test]
async fn test_predict_defaults_are_safe() {
    let (status, body) = send(router(), post_predict("{}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], 0);
    assert_eq!(body["effects"], json!(["All clear. Normal operations."]));
    assert_eq!(body["affected_areas"]["features"], json!([]));
}

#[tokio::test]
async fn test_predict_ignores_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(r#"{"water_level_m": "1.5"}"#))
        .unwrap();

    let (status, body) = send(router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], 2);
}

#[tokio::test]
async fn test_predict_with_history() {
    let (status, body) = send(
        router(),
        post_predict(
            r#"{
                "timestamp": "2024-07-15T03:00:00Z",
                "water_level_m": 1.3,
                "history": [
                    {"timestamp": "2024-07-15T01:00:00Z", "water_level_m": 1.0},
                    {"timestamp": "2024-07-15T02:00:00Z", "water_level_m": 1.2}
                ]
            }"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], 1);
}

#[tokio::test]
async fn test_predict_malformed_input() {
    for payload in [
        r#"{"water_level_m": null}"#,
        r#"{"water_level_m": "high tide"}"#,
        r#"{"timestamp": "not a time"}"#,
        r#"{"history": "yesterday"}"#,
        "{ not json",
        "",
    ] {
        let (status, body) = send(router(), post_predict(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert!(body["error"].is_string(), "payload: {}", payload);
    }
}

#[tokio::test]
async fn test_predict_classifier_failure_is_internal_error() {
    let model = inference_engine::LearnedModel::new("broken", |_| Ok(vec![0.5, 0.5]));
    let context = HazardContext::new(
        SeverityClassifier::Learned(model),
        ZoneCatalogue::empty(),
        HistoryStore::default(),
    );

    let (status, body) = send(router_with(context, 200), post_predict("{}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_timeseries() {
    let (status, body) = send(router(), get("/timeseries")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["timestamp"], "2024-07-15 00:00:00");
    assert_eq!(rows[2]["water_level_m"], 1.1);
}

#[tokio::test]
async fn test_timeseries_limits() {
    let history = HistoryStore::from_csv_str(HISTORY_CSV, 100).unwrap();
    let context = HazardContext::new(SeverityClassifier::rule_based(), zones(), history);

    let (_, body) = send(router_with(context, 2), get("/timeseries?limit=50")).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["water_level_m"], 0.9);

    let (_, body) = send(router(), get("/timeseries?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_timeseries_without_history() {
    let (status, body) = send(router_with(HazardContext::degraded(), 200), get("/timeseries")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (status, _) = send(router(), get("/metrics")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

fn router_with_telemetry() -> Router {
    let dispatcher = AlertDispatcher::new(Arc::new(alerting::DisabledGateway), AlertConfig::default());
    let broadcaster = TelemetryBroadcaster::new(
        TelemetrySimulator::seeded(7),
        Arc::new(dispatcher),
        telemetry::BroadcasterConfig::default(),
    );
    let state = AppState::new(HazardContext::degraded(), 200).with_telemetry(Arc::new(broadcaster));
    create_router(Arc::new(state), &ServerSettings::default(), &RateLimitConfig::default())
}

#[tokio::test]
async fn test_telemetry_disabled() {
    let (status, body) = send(router(), get("/ws/telemetry")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "telemetry disabled");
}

#[tokio::test]
async fn test_telemetry_requires_upgrade() {
    let (status, body) = send(router_with_telemetry(), get("/ws/telemetry")).await;
    assert_eq!(status, StatusCode::UPGRADE_REQUIRED);
    assert!(body["error"].is_string());
}
