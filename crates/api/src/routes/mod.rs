//! HTTP and WebSocket handlers

pub mod health;
pub mod predict;
pub mod telemetry;
pub mod timeseries;
