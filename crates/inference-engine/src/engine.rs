//! Severity Classifier Implementation

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fallback::FallbackEngine;
use feature_engine::FeatureVector;
use serde::Serialize;
use severity::SeverityLevel;
use tracing::{debug, info, warn};

use crate::onnx::load_onnx_model;
use crate::InferenceError;

type ProbabilityFn = dyn Fn(&FeatureVector) -> Result<Vec<f64>, InferenceError> + Send + Sync;

/// A trained classifier, seen as an opaque probability function over the
/// severity levels
#[derive(Clone)]
pub struct LearnedModel {
    source: String,
    predict_proba: Arc<ProbabilityFn>,
}

impl LearnedModel {
    /// Wrap a probability function; `source` names the artifact for logs
    pub fn new<F>(source: impl Into<String>, predict_proba: F) -> Self
    where
        F: Fn(&FeatureVector) -> Result<Vec<f64>, InferenceError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            predict_proba: Arc::new(predict_proba),
        }
    }

    /// Where the model was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run the model and check the output is one finite probability per level
    pub fn probabilities(
        &self,
        features: &FeatureVector,
    ) -> Result<[f64; SeverityLevel::COUNT], InferenceError> {
        let raw = (self.predict_proba)(features)?;

        if raw.len() != SeverityLevel::COUNT {
            return Err(InferenceError::InvalidOutputShape {
                expected: SeverityLevel::COUNT,
                actual: raw.len(),
            });
        }

        let mut probabilities = [0.0; SeverityLevel::COUNT];
        for (idx, p) in raw.into_iter().enumerate() {
            if !p.is_finite() {
                return Err(InferenceError::NonFiniteProbability(idx));
            }
            probabilities[idx] = p;
        }
        Ok(probabilities)
    }
}

impl fmt::Debug for LearnedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnedModel")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Which variant serves classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    Learned,
    RuleBased,
}

impl ClassifierMode {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierMode::Learned => "learned",
            ClassifierMode::RuleBased => "rule_based",
        }
    }
}

/// Result of one classification
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Selected severity
    pub severity: SeverityLevel,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
    /// Per-level probabilities, when a model produced them
    pub probabilities: Option<[f64; SeverityLevel::COUNT]>,
    /// Whether the rule-based fallback served this result
    pub used_fallback: bool,
}

/// Severity classifier, resolved once at process start and immutable afterwards
#[derive(Debug, Clone)]
pub enum SeverityClassifier {
    /// Externally trained probabilistic model
    Learned(LearnedModel),
    /// Water-level threshold heuristics
    RuleBased(FallbackEngine),
}

impl SeverityClassifier {
    /// Rule-based classifier with default thresholds
    pub fn rule_based() -> Self {
        SeverityClassifier::RuleBased(FallbackEngine::default())
    }

    /// Load the classifier for this process.
    ///
    /// A missing or unreadable model artifact selects the rule-based fallback.
    pub fn load(model_path: Option<&Path>, rules: FallbackEngine) -> Self {
        let Some(path) = model_path else {
            info!("No model artifact configured, using rule-based classification");
            return SeverityClassifier::RuleBased(rules);
        };

        if !path.exists() {
            warn!(
                "Model artifact {} not found, using rule-based classification",
                path.display()
            );
            return SeverityClassifier::RuleBased(rules);
        }

        match load_onnx_model(path) {
            Ok(model) => {
                info!("Loaded severity model from {}", model.source());
                SeverityClassifier::Learned(model)
            }
            Err(e) => {
                warn!("{}; falling back to rule-based classification", e);
                SeverityClassifier::RuleBased(rules)
            }
        }
    }

    /// Which variant is active
    pub fn mode(&self) -> ClassifierMode {
        match self {
            SeverityClassifier::Learned(_) => ClassifierMode::Learned,
            SeverityClassifier::RuleBased(_) => ClassifierMode::RuleBased,
        }
    }

    /// Classify a feature vector into exactly one severity level
    pub fn classify(&self, features: &FeatureVector) -> Result<Classification, InferenceError> {
        match self {
            SeverityClassifier::Learned(model) => {
                let probabilities = model.probabilities(features)?;

                // First maximum wins on ties
                let mut best = 0;
                for (idx, p) in probabilities.iter().enumerate() {
                    if *p > probabilities[best] {
                        best = idx;
                    }
                }

                let severity = SeverityLevel::from_index(best as i64).ok_or(
                    InferenceError::InvalidOutputShape {
                        expected: SeverityLevel::COUNT,
                        actual: best + 1,
                    },
                )?;
                let confidence = probabilities[best].clamp(0.0, 1.0);

                debug!("Model prediction: {} (conf={:.2})", severity, confidence);

                Ok(Classification {
                    severity,
                    confidence,
                    probabilities: Some(probabilities),
                    used_fallback: false,
                })
            }
            SeverityClassifier::RuleBased(engine) => {
                let (severity, confidence) = engine.classify(features);
                Ok(Classification {
                    severity,
                    confidence,
                    probabilities: None,
                    used_fallback: true,
                })
            }
        }
    }
}
