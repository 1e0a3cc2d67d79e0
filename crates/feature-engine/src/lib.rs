//! Feature Engineering Engine
//!
//! Turns time-ordered sensor observations into the fixed 13-field feature vector
//! consumed by the severity classifier: raw readings, water-level lags, trailing
//! rolling statistics and cyclical hour/month encodings.

mod features;
mod observation;
mod statistics;
mod time_encoding;

pub use features::{FeatureBuilder, FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES, LAG_DEPTH, ROLLING_WINDOW};
pub use observation::{parse_timestamp, Observation};
pub use statistics::{back_fill, lag, rolling_max, rolling_mean};
pub use time_encoding::cyclical;

use thiserror::Error;

/// Errors during feature construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Cannot build features from an empty batch")]
    EmptyBatch,
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("Invalid timestamp '{0}': expected ISO-8601")]
    InvalidTimestamp(String),
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}
