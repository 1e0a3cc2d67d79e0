//! Live coastal telemetry: a weather simulator, threshold alerts and a
//! broadcast channel for connected clients.

mod broadcaster;
mod reading;
mod simulator;

pub use broadcaster::{BroadcasterConfig, TelemetryBroadcaster};
pub use reading::TelemetryReading;
pub use simulator::TelemetrySimulator;
