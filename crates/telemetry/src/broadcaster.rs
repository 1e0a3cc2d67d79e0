//! Telemetry broadcast loop
//!
//! Samples the simulator on a fixed interval, raises SMS alerts on threshold
//! breaches and fans each reading out to subscribers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alerting::{AlertDispatcher, DispatchOutcome, TelemetryThresholds};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::reading::TelemetryReading;
use crate::simulator::TelemetrySimulator;

/// Broadcast loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcasterConfig {
    /// Seconds between readings
    pub interval_secs: u64,
    /// Readings buffered per subscriber before it lags
    pub channel_capacity: usize,
    pub thresholds: TelemetryThresholds,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            channel_capacity: 64,
            thresholds: TelemetryThresholds::default(),
        }
    }
}

/// Publishes simulated telemetry to every subscriber
pub struct TelemetryBroadcaster {
    tx: broadcast::Sender<TelemetryReading>,
    simulator: Mutex<TelemetrySimulator>,
    dispatcher: Arc<AlertDispatcher>,
    config: BroadcasterConfig,
}

impl TelemetryBroadcaster {
    pub fn new(
        simulator: TelemetrySimulator,
        dispatcher: Arc<AlertDispatcher>,
        config: BroadcasterConfig,
    ) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            tx,
            simulator: Mutex::new(simulator),
            dispatcher,
            config,
        }
    }

    /// Receive every reading published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryReading> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Produce a fresh reading and run the threshold check on it.
    ///
    /// A breach sets `alert_active` and attempts an SMS alert.
    pub async fn sample(&self) -> TelemetryReading {
        let mut reading = match self.simulator.lock() {
            Ok(mut simulator) => simulator.next_reading(),
            Err(poisoned) => poisoned.into_inner().next_reading(),
        };

        let thresholds = &self.config.thresholds;
        reading.alert_active = thresholds.is_breached(reading.wind_speed, reading.wave_height);

        if reading.alert_active {
            metrics::counter!("tideguard_telemetry_alerts_total").increment(1);
            let message = TelemetryThresholds::alert_message(reading.wind_speed, reading.wave_height);
            warn!("Telemetry threshold breached: {}", message);

            match self.dispatcher.dispatch(&message).await {
                DispatchOutcome::Sent(sid) => info!("SMS alert sent: {}", sid),
                DispatchOutcome::CooldownActive => debug!("SMS alert suppressed by cooldown"),
                DispatchOutcome::NotConfigured => debug!("SMS alert skipped, no gateway"),
                DispatchOutcome::Failed(e) => warn!("SMS alert failed: {}", e),
            }
        }

        reading
    }

    /// Sample once and publish the reading to all subscribers
    pub async fn tick(&self) -> TelemetryReading {
        let reading = self.sample().await;
        match self.tx.send(reading.clone()) {
            Ok(receivers) => debug!("Broadcast reading to {} subscribers", receivers),
            Err(_) => debug!("No telemetry subscribers"),
        }
        reading
    }

    /// Run the broadcast loop until the task is dropped
    pub async fn run(self: Arc<Self>) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Telemetry broadcaster started (every {}s)", period.as_secs());
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Spawn [`run`](Self::run) onto the runtime
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run())
    }
}

impl std::fmt::Debug for TelemetryBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryBroadcaster")
            .field("subscribers", &self.tx.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}
