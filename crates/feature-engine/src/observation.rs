//! Sensor Observation

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Naive layouts accepted after RFC 3339 fails (interpreted as UTC)
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A single coastal sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Reading time, keeping the offset it was reported in.
    /// Observations without a time get no cyclical encodings.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// Water level (m)
    pub water_level_m: f64,
    /// Wind speed (m/s)
    pub wind_speed_mps: f64,
    /// Atmospheric pressure (hPa)
    pub pressure_hpa: f64,
    /// Predicted astronomical tide (m)
    pub tide_predicted_m: f64,
}

impl Observation {
    pub const DEFAULT_WATER_LEVEL_M: f64 = 0.9;
    pub const DEFAULT_WIND_SPEED_MPS: f64 = 4.0;
    pub const DEFAULT_PRESSURE_HPA: f64 = 1008.0;
    pub const DEFAULT_TIDE_PREDICTED_M: f64 = 0.85;

    /// Create an observation at the given time with default readings
    pub fn at(timestamp: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// Builder-style water level override
    pub fn with_water_level(mut self, water_level_m: f64) -> Self {
        self.water_level_m = water_level_m;
        self
    }

    /// Check that every reading is a finite number
    pub fn validate(&self) -> Result<(), FeatureError> {
        let readings = [
            ("water_level_m", self.water_level_m),
            ("wind_speed_mps", self.wind_speed_mps),
            ("pressure_hpa", self.pressure_hpa),
            ("tide_predicted_m", self.tide_predicted_m),
        ];
        for (field, value) in readings {
            if !value.is_finite() {
                return Err(FeatureError::NonFinite { field, value });
            }
        }
        Ok(())
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            timestamp: None,
            water_level_m: Self::DEFAULT_WATER_LEVEL_M,
            wind_speed_mps: Self::DEFAULT_WIND_SPEED_MPS,
            pressure_hpa: Self::DEFAULT_PRESSURE_HPA,
            tide_predicted_m: Self::DEFAULT_TIDE_PREDICTED_M,
        }
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Offsets are preserved so hour/month encodings use the reporter's wall clock.
/// Values without an offset, including bare dates, are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, FeatureError> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight).fixed_offset());
        }
    }

    Err(FeatureError::InvalidTimestamp(raw.to_string()))
}
