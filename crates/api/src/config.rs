//! Service configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then environment
//! variables prefixed with `TIDEGUARD` (e.g. `TIDEGUARD__SERVER__PORT=8080`).
//! The conventional Twilio variables override the `sms` section.

use std::path::PathBuf;

use alerting::{SmsConfig, TelemetryThresholds};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use telemetry::BroadcasterConfig;

use crate::rate_limit::RateLimitConfig;

/// Default config file, overridable with `TIDEGUARD_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "tideguard.toml";

/// Twilio environment variables mapped onto `sms.*`
const TWILIO_OVERRIDES: [(&str, &str); 4] = [
    ("sms.account_sid", "TWILIO_ACCOUNT_SID"),
    ("sms.auth_token", "TWILIO_AUTH_TOKEN"),
    ("sms.from_number", "TWILIO_PHONE_NUMBER"),
    ("sms.to_number", "ALERT_PHONE_NUMBER"),
];

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub telemetry: TelemetrySettings,
    pub sms: SmsConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("TIDEGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load using an explicit config file path (the file may be absent)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("TIDEGUARD")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, var) in TWILIO_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allow any origin
    pub cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors: true,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Startup data sources. Every file is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// ONNX severity classifier
    pub model_path: Option<PathBuf>,
    /// GeoJSON FeatureCollection of zones
    pub zones_path: PathBuf,
    /// Historical observations CSV
    pub history_path: PathBuf,
    /// Rows served by `GET /timeseries`
    pub history_limit: usize,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            model_path: Some(PathBuf::from("model.onnx")),
            zones_path: PathBuf::from("areas.geojson"),
            history_path: PathBuf::from("historical.csv"),
            history_limit: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub interval_secs: u64,
    pub channel_capacity: usize,
    pub wind_threshold_kmh: f64,
    pub wave_threshold_m: f64,
    pub sms_cooldown_secs: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
            channel_capacity: 64,
            wind_threshold_kmh: 80.0,
            wave_threshold_m: 4.0,
            sms_cooldown_secs: 300,
        }
    }
}

impl TelemetrySettings {
    pub fn broadcaster_config(&self) -> BroadcasterConfig {
        BroadcasterConfig {
            interval_secs: self.interval_secs,
            channel_capacity: self.channel_capacity,
            thresholds: TelemetryThresholds {
                wind_speed_kmh: self.wind_threshold_kmh,
                wave_height_m: self.wave_threshold_m,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,tower_http=info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.data.history_limit, 200);
        assert_eq!(settings.telemetry.interval_secs, 5);
        assert_eq!(settings.telemetry.sms_cooldown_secs, 300);
        assert!(!settings.rate_limit.enabled);
        assert!(!settings.sms.is_complete());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[data]\nhistory_limit = 50\n\n[telemetry]\nenabled = false\nwind_threshold_kmh = 70.0"
        )
        .unwrap();

        let settings = Settings::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.data.history_limit, 50);
        assert_eq!(settings.data.zones_path, PathBuf::from("areas.geojson"));
        assert!(!settings.telemetry.enabled);

        let broadcaster = settings.telemetry.broadcaster_config();
        assert_eq!(broadcaster.thresholds.wind_speed_kmh, 70.0);
        assert_eq!(broadcaster.thresholds.wave_height_m, 4.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from("/nonexistent/tideguard.toml").unwrap();
        assert_eq!(settings.server.port, 5000);
    }
}
