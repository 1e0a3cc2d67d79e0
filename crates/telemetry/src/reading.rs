//! Telemetry Reading

use serde::{Deserialize, Serialize};

/// One simulated weather sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Unix seconds
    pub timestamp: i64,
    /// km/h
    pub wind_speed: f64,
    /// metres
    pub wave_height: f64,
    pub weather_condition: String,
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// Set when the sample breached an alert threshold
    #[serde(default)]
    pub alert_active: bool,
}
