//! Hazard prediction pipeline
//!
//! Features, classification, affected zones and advisories for one observation.

use std::path::Path;

use fallback::FallbackEngine;
use feature_engine::{FeatureBuilder, FeatureError, Observation};
use impact::{AdvisoryCatalogue, FeatureCollection, ImpactResolver, ZoneCatalogue};
use inference_engine::{ClassifierMode, InferenceError, SeverityClassifier};
use serde::Serialize;
use severity::SeverityLevel;
use storage::HistoryStore;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DataSettings;

/// Errors that abort a prediction
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("feature construction failed: {0}")]
    Features(#[from] FeatureError),
    #[error("classification failed: {0}")]
    Classification(#[from] InferenceError),
}

/// Process-wide read-only data, built once at startup
#[derive(Debug)]
pub struct HazardContext {
    classifier: SeverityClassifier,
    zones: ZoneCatalogue,
    history: HistoryStore,
}

impl HazardContext {
    pub fn new(classifier: SeverityClassifier, zones: ZoneCatalogue, history: HistoryStore) -> Self {
        Self {
            classifier,
            zones,
            history,
        }
    }

    /// Rule-based classifier, no zones, no history
    pub fn degraded() -> Self {
        Self::new(
            SeverityClassifier::rule_based(),
            ZoneCatalogue::empty(),
            HistoryStore::default(),
        )
    }

    /// Load every optional data source, degrading on absent or unreadable files
    pub fn load(data: &DataSettings) -> Self {
        let classifier = SeverityClassifier::load(data.model_path.as_deref(), FallbackEngine::default());
        let zones = load_zones(&data.zones_path);
        let history = load_history(&data.history_path, data.history_limit);
        Self::new(classifier, zones, history)
    }

    pub fn classifier_mode(&self) -> ClassifierMode {
        self.classifier.mode()
    }

    pub fn zones(&self) -> &ZoneCatalogue {
        &self.zones
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}

fn load_zones(path: &Path) -> ZoneCatalogue {
    ZoneCatalogue::load(path).unwrap_or_else(|e| {
        warn!("Zone catalogue {} unreadable ({}), no zones loaded", path.display(), e);
        ZoneCatalogue::empty()
    })
}

fn load_history(path: &Path, limit: usize) -> HistoryStore {
    HistoryStore::load_csv(path, limit).unwrap_or_else(|e| {
        warn!("History file {} unreadable ({}), serving empty history", path.display(), e);
        HistoryStore::new(limit)
    })
}

/// Output of one prediction
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Severity index 0-3
    pub severity: SeverityLevel,
    /// Advisories for the severity
    pub effects: Vec<String>,
    /// Zones affected at this severity
    pub affected_areas: FeatureCollection,
    pub confidence: f64,
}

/// Runs the prediction pipeline against a [`HazardContext`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionService {
    features: FeatureBuilder,
    resolver: ImpactResolver,
}

impl PredictionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predict severity and impacts for `current`.
    ///
    /// `history` supplies earlier observations for lags and rolling windows.
    pub fn predict(
        &self,
        context: &HazardContext,
        current: &Observation,
        history: &[Observation],
    ) -> Result<PredictionResult, PredictionError> {
        let outcome = self.run(context, current, history);
        match &outcome {
            Ok(result) => {
                metrics::counter!("tideguard_predictions_total", "severity" => result.severity.as_str())
                    .increment(1);
            }
            Err(e) => {
                warn!("Prediction failed: {}", e);
                metrics::counter!("tideguard_prediction_failures_total").increment(1);
            }
        }
        outcome
    }

    fn run(
        &self,
        context: &HazardContext,
        current: &Observation,
        history: &[Observation],
    ) -> Result<PredictionResult, PredictionError> {
        let vector = self.features.build_for(current, history)?;
        let classification = context.classifier.classify(&vector)?;
        let severity = classification.severity;

        let affected = self.resolver.resolve(context.zones.zones(), severity);
        let effects = AdvisoryCatalogue::advisories_for(severity)
            .iter()
            .map(|s| s.to_string())
            .collect();

        debug!(
            "Predicted {} (conf={:.2}, fallback={}), {} zones affected",
            severity,
            classification.confidence,
            classification.used_fallback,
            affected.len()
        );

        Ok(PredictionResult {
            severity,
            effects,
            affected_areas: FeatureCollection::from_zones(&affected),
            confidence: classification.confidence,
        })
    }
}
