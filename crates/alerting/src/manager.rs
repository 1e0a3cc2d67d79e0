//! Alert Manager Implementation

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Minimum gap between SMS alerts (seconds)
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 300, // 5 minutes
        }
    }
}

/// State of the last delivered alert
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time an alert was delivered
    pub last_fired: Instant,
    /// Number of alerts delivered
    pub fire_count: usize,
}

/// Tracks the SMS cooldown window.
///
/// The window only starts after a successful delivery, so failed sends can be
/// retried on the next breach.
#[derive(Debug)]
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Delivery state, `None` until the first alert goes out
    state: Option<AlertState>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self { config, state: None }
    }

    /// Check whether an alert may be sent at `now`
    pub fn should_fire(&self, now: Instant) -> bool {
        match &self.state {
            Some(state) => {
                let cooldown = Duration::from_secs(self.config.cooldown_seconds);
                let elapsed = now.saturating_duration_since(state.last_fired);
                if elapsed < cooldown {
                    debug!("Alert suppressed: cooldown active ({}s elapsed)", elapsed.as_secs());
                    return false;
                }
                true
            }
            None => true,
        }
    }

    /// Record a successful delivery at `now`
    pub fn record_fire(&mut self, now: Instant) {
        let fire_count = self.state.as_ref().map_or(0, |s| s.fire_count) + 1;
        self.state = Some(AlertState {
            last_fired: now,
            fire_count,
        });
        info!("Alert recorded (count: {})", fire_count);
    }

    /// Number of alerts delivered
    pub fn fire_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.fire_count)
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_alert_fires() {
        let manager = AlertManager::default();
        assert!(manager.should_fire(Instant::now()));
        assert_eq!(manager.fire_count(), 0);
    }

    #[test]
    fn test_cooldown() {
        let mut manager = AlertManager::new(AlertConfig { cooldown_seconds: 300 });
        let start = Instant::now();

        manager.record_fire(start);
        assert!(!manager.should_fire(start + Duration::from_secs(10)));
        assert!(!manager.should_fire(start + Duration::from_secs(299)));
        assert!(manager.should_fire(start + Duration::from_secs(300)));
        assert_eq!(manager.fire_count(), 1);
    }
}
