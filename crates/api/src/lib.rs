//! TideGuard API Server
//!
//! Coastal hazard predictions over REST and live telemetry over WebSocket.

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod service;

use alerting::{gateway_from_config, AlertConfig, AlertDispatcher};
use telemetry::{TelemetryBroadcaster, TelemetrySimulator};

pub use crate::config::Settings;
pub use error::ApiError;
pub use service::{HazardContext, PredictionError, PredictionResult, PredictionService};

use crate::config::{LoggingSettings, ServerSettings};
use crate::rate_limit::{create_governor_config, RateLimitConfig};

/// Application state shared across handlers, immutable after startup
pub struct AppState {
    /// Classifier, zones and history
    pub context: HazardContext,
    pub predictor: PredictionService,
    /// Live telemetry, when enabled
    pub telemetry: Option<Arc<TelemetryBroadcaster>>,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Rows served by `GET /timeseries`
    pub history_limit: usize,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(context: HazardContext, history_limit: usize) -> Self {
        Self {
            context,
            predictor: PredictionService::new(),
            telemetry: None,
            metrics: None,
            history_limit,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_telemetry(mut self, broadcaster: Arc<TelemetryBroadcaster>) -> Self {
        self.telemetry = Some(broadcaster);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Load data sources and wire telemetry from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let context = HazardContext::load(&settings.data);
        let mut state = Self::new(context, settings.data.history_limit);

        if settings.telemetry.enabled {
            let dispatcher = AlertDispatcher::new(
                gateway_from_config(&settings.sms),
                AlertConfig {
                    cooldown_seconds: settings.telemetry.sms_cooldown_secs,
                },
            );
            let broadcaster = TelemetryBroadcaster::new(
                TelemetrySimulator::from_entropy(),
                Arc::new(dispatcher),
                settings.telemetry.broadcaster_config(),
            );
            state = state.with_telemetry(Arc::new(broadcaster));
        } else {
            info!("Telemetry broadcaster disabled");
        }

        state
    }
}

/// Create the application router
pub fn create_router(
    state: Arc<AppState>,
    server: &ServerSettings,
    rate_limit: &RateLimitConfig,
) -> Router {
    let mut router = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .route("/predict", post(routes::predict::predict))
        .route("/timeseries", get(routes::timeseries::get_timeseries))
        .route("/ws/telemetry", get(routes::telemetry::telemetry_socket))
        .with_state(state);

    if rate_limit.enabled {
        if let Some(config) = create_governor_config(rate_limit) {
            info!(
                "Rate limiting enabled (burst {}, 1 request per {}s)",
                rate_limit.burst_size, rate_limit.per_second
            );
            router = router.layer(GovernorLayer { config });
        }
    }

    if server.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http())
}

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Install the Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}", e);
            None
        }
    }
}

/// Run the server
pub async fn run_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::from_settings(&settings);
    if let Some(handle) = init_metrics() {
        state = state.with_metrics(handle);
    }

    info!(
        "Classifier: {}, zones: {}, history records: {}",
        state.context.classifier_mode().as_str(),
        state.context.zones().len(),
        state.context.history().len()
    );

    if let Some(broadcaster) = &state.telemetry {
        broadcaster.spawn();
    }

    let app = create_router(Arc::new(state), &settings.server, &settings.rate_limit);
    let addr = settings.server.bind_addr();

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests;
