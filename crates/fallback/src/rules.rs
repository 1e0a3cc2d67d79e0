//! Water-Level Threshold Rules

use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use severity::SeverityLevel;
use tracing::debug;

/// Fixed confidence reported for heuristic classifications
pub const RULE_CONFIDENCE: f64 = 0.5;

/// Margins above the baseline water level (metres).
///
/// Each bound is inclusive: a level equal to `baseline + moderate_margin` is still Safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Normal water level
    pub baseline_m: f64,
    /// Upper bound of Safe, above baseline
    pub moderate_margin_m: f64,
    /// Upper bound of Moderate, above baseline
    pub high_margin_m: f64,
    /// Upper bound of High, above baseline
    pub extreme_margin_m: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            baseline_m: 0.8,
            moderate_margin_m: 0.3,
            high_margin_m: 0.6,
            extreme_margin_m: 1.0,
        }
    }
}

/// Rule-based severity classifier
#[derive(Debug, Clone, Default)]
pub struct FallbackEngine {
    thresholds: RuleThresholds,
}

impl FallbackEngine {
    /// Create a fallback engine with custom thresholds
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify a raw water level
    pub fn classify_level(&self, water_level_m: f64) -> SeverityLevel {
        let t = &self.thresholds;

        // Bounds are summed at call time so boundary values compare exactly as
        // `baseline + margin` does in the training pipeline.
        let severity = if water_level_m <= t.baseline_m + t.moderate_margin_m {
            SeverityLevel::Safe
        } else if water_level_m <= t.baseline_m + t.high_margin_m {
            SeverityLevel::Moderate
        } else if water_level_m <= t.baseline_m + t.extreme_margin_m {
            SeverityLevel::High
        } else {
            SeverityLevel::Extreme
        };

        debug!("Fallback rule: water_level={} -> {}", water_level_m, severity);
        severity
    }

    /// Classify a feature vector, returning `(severity, confidence)`
    pub fn classify(&self, features: &FeatureVector) -> (SeverityLevel, f64) {
        (self.classify_level(features.water_level_m()), RULE_CONFIDENCE)
    }
}
