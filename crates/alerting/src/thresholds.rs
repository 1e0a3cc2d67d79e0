//! Telemetry Threshold Checks

use serde::{Deserialize, Serialize};

/// Limits above which live telemetry raises an alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryThresholds {
    /// Wind speed limit (km/h)
    pub wind_speed_kmh: f64,
    /// Wave height limit (m)
    pub wave_height_m: f64,
}

impl Default for TelemetryThresholds {
    fn default() -> Self {
        Self {
            wind_speed_kmh: 80.0,
            wave_height_m: 4.0,
        }
    }
}

impl TelemetryThresholds {
    /// True when either reading is strictly above its limit
    pub fn is_breached(&self, wind_speed_kmh: f64, wave_height_m: f64) -> bool {
        wind_speed_kmh > self.wind_speed_kmh || wave_height_m > self.wave_height_m
    }

    /// Operator-facing summary of the readings
    pub fn alert_message(wind_speed_kmh: f64, wave_height_m: f64) -> String {
        format!("Wind: {} km/h, Waves: {}m", wind_speed_kmh, wave_height_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breach_cases() {
        let thresholds = TelemetryThresholds::default();

        assert!(thresholds.is_breached(85.0, 2.0));
        assert!(thresholds.is_breached(70.0, 5.0));
        assert!(thresholds.is_breached(85.0, 5.0));
        assert!(!thresholds.is_breached(70.0, 2.0));
    }

    #[test]
    fn test_limits_are_exclusive() {
        let thresholds = TelemetryThresholds::default();
        assert!(!thresholds.is_breached(80.0, 4.0));
        assert!(thresholds.is_breached(80.1, 4.0));
    }

    #[test]
    fn test_alert_message() {
        assert_eq!(
            TelemetryThresholds::alert_message(85.5, 4.2),
            "Wind: 85.5 km/h, Waves: 4.2m"
        );
    }
}
