//! Prediction Routes

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use feature_engine::{parse_timestamp, Observation};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::service::PredictionResult;
use crate::AppState;

/// `POST /predict`
///
/// The body is parsed as JSON regardless of content type.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionResult>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e)))?;
    let (current, history) = parse_request(&payload)?;

    debug!(
        "Predict request: water_level_m={} with {} history records",
        current.water_level_m,
        history.len()
    );

    let result = state.predictor.predict(&state.context, &current, &history)?;
    Ok(Json(result))
}

/// Split a request body into the current observation and its history
pub fn parse_request(payload: &Value) -> Result<(Observation, Vec<Observation>), ApiError> {
    let object = as_object(payload, "request body")?;
    let current = parse_observation(object)?;

    let history = match object.get("history") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                as_object(item, "history record")
                    .and_then(parse_observation)
                    .map_err(|e| ApiError::BadRequest(format!("history[{}]: {}", idx, e)))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ApiError::BadRequest("history must be an array".to_string())),
    };

    Ok((current, history))
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ApiError> {
    value
        .as_object()
        .ok_or_else(|| ApiError::BadRequest(format!("{} must be a JSON object", what)))
}

/// Readings default when absent. `null` and non-numeric values are rejected.
fn parse_observation(object: &Map<String, Value>) -> Result<Observation, ApiError> {
    let timestamp = match object.get("timestamp") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            Some(parse_timestamp(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?)
        }
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "timestamp must be a string, got {}",
                other
            )))
        }
    };

    Ok(Observation {
        timestamp,
        water_level_m: reading(object, "water_level_m", Observation::DEFAULT_WATER_LEVEL_M)?,
        wind_speed_mps: reading(object, "wind_speed_mps", Observation::DEFAULT_WIND_SPEED_MPS)?,
        pressure_hpa: reading(object, "pressure_hpa", Observation::DEFAULT_PRESSURE_HPA)?,
        tide_predicted_m: reading(
            object,
            "tide_predicted_m",
            Observation::DEFAULT_TIDE_PREDICTED_M,
        )?,
    })
}

fn reading(object: &Map<String, Value>, field: &str, default: f64) -> Result<f64, ApiError> {
    let raw = match object.get(field) {
        None => return Ok(default),
        Some(raw) => raw,
    };

    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be a finite number, got {}",
            field, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_uses_defaults() {
        let (current, history) = parse_request(&json!({})).unwrap();
        assert_eq!(current, Observation::default());
        assert!(history.is_empty());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let (current, _) = parse_request(&json!({
            "water_level_m": "1.75",
            "wind_speed_mps": 12,
            "pressure_hpa": " 1001.5 "
        }))
        .unwrap();

        assert_eq!(current.water_level_m, 1.75);
        assert_eq!(current.wind_speed_mps, 12.0);
        assert_eq!(current.pressure_hpa, 1001.5);
        assert_eq!(current.tide_predicted_m, Observation::DEFAULT_TIDE_PREDICTED_M);
    }

    #[test]
    fn test_malformed_readings_rejected() {
        for body in [
            json!({"water_level_m": null}),
            json!({"water_level_m": "high"}),
            json!({"wind_speed_mps": [1, 2]}),
            json!({"pressure_hpa": "NaN"}),
            json!({"tide_predicted_m": true}),
        ] {
            let err = parse_request(&body).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{}", body);
        }
    }

    #[test]
    fn test_timestamp_handling() {
        let (current, _) = parse_request(&json!({"timestamp": "2024-07-15T18:00:00+05:30"})).unwrap();
        assert!(current.timestamp.is_some());

        let (current, _) = parse_request(&json!({"timestamp": null})).unwrap();
        assert!(current.timestamp.is_none());

        assert!(parse_request(&json!({"timestamp": "yesterday"})).is_err());
        assert!(parse_request(&json!({"timestamp": 1700000000})).is_err());
    }

    #[test]
    fn test_history_records() {
        let (_, history) = parse_request(&json!({
            "water_level_m": 1.2,
            "history": [
                {"timestamp": "2024-07-15 16:00:00", "water_level_m": 0.9},
                {"timestamp": "2024-07-15 17:00:00", "water_level_m": "1.0"}
            ]
        }))
        .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].water_level_m, 1.0);
        assert_eq!(history[0].wind_speed_mps, Observation::DEFAULT_WIND_SPEED_MPS);
    }

    #[test]
    fn test_bad_history_rejected() {
        assert!(parse_request(&json!({"history": {"water_level_m": 1.0}})).is_err());
        assert!(parse_request(&json!({"history": [42]})).is_err());

        let err = parse_request(&json!({"history": [{"water_level_m": null}]})).unwrap_err();
        assert!(err.to_string().starts_with("history[0]:"));
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(parse_request(&json!([1, 2, 3])).is_err());
        assert!(parse_request(&json!("water")).is_err());
    }
}
