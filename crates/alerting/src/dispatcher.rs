//! Alert Dispatch

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::manager::{AlertConfig, AlertManager};
use crate::sms::SmsGateway;

/// Prefix prepended to every SMS body
pub const ALERT_PREFIX: &str = "TIDEGUARD ALERT: ";

/// Result of a dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Message delivered, with the provider message id
    Sent(String),
    /// Suppressed by the cooldown window
    CooldownActive,
    /// No gateway configured
    NotConfigured,
    /// Gateway error; the cooldown was not started
    Failed(String),
}

/// Sends SMS alerts through a gateway, honouring the cooldown window.
///
/// The manager lock is held from the cooldown check until the send is
/// recorded, so overlapping dispatches are serialized.
pub struct AlertDispatcher {
    gateway: Arc<dyn SmsGateway>,
    manager: Mutex<AlertManager>,
}

impl AlertDispatcher {
    pub fn new(gateway: Arc<dyn SmsGateway>, config: AlertConfig) -> Self {
        Self {
            gateway,
            manager: Mutex::new(AlertManager::new(config)),
        }
    }

    /// Whether the underlying gateway can deliver
    pub fn is_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    /// Try to send `message`, prefixed with [`ALERT_PREFIX`]
    pub async fn dispatch(&self, message: &str) -> DispatchOutcome {
        if !self.gateway.is_configured() {
            debug!("SMS gateway not configured, skipping alert: {}", message);
            return DispatchOutcome::NotConfigured;
        }

        let mut manager = self.manager.lock().await;
        if !manager.should_fire(Instant::now()) {
            return DispatchOutcome::CooldownActive;
        }

        let body = format!("{}{}", ALERT_PREFIX, message);
        match self.gateway.send(&body).await {
            Ok(sid) => {
                manager.record_fire(Instant::now());
                DispatchOutcome::Sent(sid)
            }
            Err(e) => {
                warn!("Failed to send SMS alert: {}", e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Number of alerts delivered
    pub async fn fire_count(&self) -> usize {
        self.manager.lock().await.fire_count()
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("configured", &self.gateway.is_configured())
            .field(
                "fire_count",
                &self.manager.try_lock().ok().map(|m| m.fire_count()),
            )
            .finish()
    }
}
