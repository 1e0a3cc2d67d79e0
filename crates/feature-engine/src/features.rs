//! Feature Vector Assembly

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observation::Observation;
use crate::statistics::{back_fill, lag, rolling_max, rolling_mean};
use crate::time_encoding::cyclical;
use crate::FeatureError;

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 13;

/// Water-level lag depth
pub const LAG_DEPTH: usize = 3;

/// Trailing window for rolling statistics
pub const ROLLING_WINDOW: usize = 6;

/// Feature names in schema order. Training and serving must agree on this exactly.
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "water_level_m",
    "wind_speed_mps",
    "pressure_hpa",
    "tide_predicted_m",
    "water_level_m_lag1",
    "water_level_m_lag2",
    "water_level_m_lag3",
    "rolling_max_6",
    "rolling_mean_6",
    "hour_sin",
    "hour_cos",
    "month_sin",
    "month_cos",
];

const WATER_LEVEL: usize = 0;
const WIND_SPEED: usize = 1;
const PRESSURE: usize = 2;
const TIDE_PREDICTED: usize = 3;
const LAG_START: usize = 4;
const ROLLING_MAX: usize = 7;
const ROLLING_MEAN: usize = 8;
const HOUR_SIN: usize = 9;
const HOUR_COS: usize = 10;
const MONTH_SIN: usize = 11;
const MONTH_COS: usize = 12;

/// Feature vector for severity classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Build from raw values in schema order
    pub fn from_values(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self { values }
    }

    /// Raw values in schema order
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Result<f64, FeatureError> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
            .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))
    }

    /// Current water level (m)
    pub fn water_level_m(&self) -> f64 {
        self.values[WATER_LEVEL]
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

/// Builds feature vectors from time-ordered observation batches.
///
/// Stateless: the same batch always yields bit-identical vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Create a new feature builder
    pub fn new() -> Self {
        Self
    }

    /// Build one vector per observation, returned in time order.
    ///
    /// The batch is stably sorted by timestamp with untimed observations last.
    pub fn build(&self, observations: &[Observation]) -> Result<Vec<FeatureVector>, FeatureError> {
        let batch: Vec<&Observation> = observations.iter().collect();
        let order = self.time_order(&batch)?;
        let sorted: Vec<&Observation> = order.iter().map(|&i| batch[i]).collect();
        Ok(self.assemble(&sorted))
    }

    /// Build the vector for `current`, using `history` for lags and rolling windows
    pub fn build_for(
        &self,
        current: &Observation,
        history: &[Observation],
    ) -> Result<FeatureVector, FeatureError> {
        let batch: Vec<&Observation> = history.iter().chain(std::iter::once(current)).collect();
        let current_idx = history.len();

        let order = self.time_order(&batch)?;
        let sorted: Vec<&Observation> = order.iter().map(|&i| batch[i]).collect();
        let position = order
            .iter()
            .position(|&i| i == current_idx)
            .ok_or(FeatureError::EmptyBatch)?;

        let mut vectors = self.assemble(&sorted);
        Ok(vectors.swap_remove(position))
    }

    /// Validate the batch and return indices in time order
    fn time_order(&self, batch: &[&Observation]) -> Result<Vec<usize>, FeatureError> {
        if batch.is_empty() {
            return Err(FeatureError::EmptyBatch);
        }
        for obs in batch {
            obs.validate()?;
        }

        let mut order: Vec<usize> = (0..batch.len()).collect();
        order.sort_by(|&a, &b| compare_time(batch[a].timestamp, batch[b].timestamp));
        Ok(order)
    }

    fn assemble(&self, sorted: &[&Observation]) -> Vec<FeatureVector> {
        let water: Vec<f64> = sorted.iter().map(|o| o.water_level_m).collect();

        debug!("Building features for {} observations", sorted.len());

        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(sorted.len()); FEATURE_DIMENSION];

        columns[WATER_LEVEL] = water.iter().map(|v| Some(*v)).collect();
        columns[WIND_SPEED] = sorted.iter().map(|o| Some(o.wind_speed_mps)).collect();
        columns[PRESSURE] = sorted.iter().map(|o| Some(o.pressure_hpa)).collect();
        columns[TIDE_PREDICTED] = sorted.iter().map(|o| Some(o.tide_predicted_m)).collect();

        for k in 1..=LAG_DEPTH {
            columns[LAG_START + k - 1] = lag(&water, k);
        }

        columns[ROLLING_MAX] = rolling_max(&water, ROLLING_WINDOW).into_iter().map(Some).collect();
        columns[ROLLING_MEAN] = rolling_mean(&water, ROLLING_WINDOW).into_iter().map(Some).collect();

        let hours: Vec<Option<(f64, f64)>> = sorted
            .iter()
            .map(|o| o.timestamp.map(|t| cyclical(t.hour(), 24)))
            .collect();
        let months: Vec<Option<(f64, f64)>> = sorted
            .iter()
            .map(|o| o.timestamp.map(|t| cyclical(t.month(), 12)))
            .collect();

        columns[HOUR_SIN] = hours.iter().map(|h| h.map(|(s, _)| s)).collect();
        columns[HOUR_COS] = hours.iter().map(|h| h.map(|(_, c)| c)).collect();
        columns[MONTH_SIN] = months.iter().map(|m| m.map(|(s, _)| s)).collect();
        columns[MONTH_COS] = months.iter().map(|m| m.map(|(_, c)| c)).collect();

        // Back-fill first, then zero-fill whatever is still undefined
        for column in columns.iter_mut() {
            back_fill(column);
        }

        (0..sorted.len())
            .map(|row| {
                let mut values = [0.0; FEATURE_DIMENSION];
                for (idx, column) in columns.iter().enumerate() {
                    values[idx] = column[row].unwrap_or(0.0);
                }
                FeatureVector { values }
            })
            .collect()
    }
}

fn compare_time(a: Option<DateTime<FixedOffset>>, b: Option<DateTime<FixedOffset>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
