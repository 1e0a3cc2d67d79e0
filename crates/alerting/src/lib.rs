//! Alerting System
//!
//! Threshold checks on live telemetry, SMS cooldown tracking, and the SMS
//! gateway used to notify operators.

mod dispatcher;
mod manager;
mod sms;
mod thresholds;

pub use dispatcher::{AlertDispatcher, DispatchOutcome, ALERT_PREFIX};
pub use manager::{AlertConfig, AlertManager, AlertState};
pub use sms::{gateway_from_config, DisabledGateway, SmsConfig, SmsGateway, TwilioGateway, TWILIO_API_BASE};
pub use thresholds::TelemetryThresholds;

use thiserror::Error;

/// Errors delivering an alert
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("SMS gateway not configured")]
    NotConfigured,
    #[error("SMS request failed: {0}")]
    Transport(String),
    #[error("SMS gateway rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}
