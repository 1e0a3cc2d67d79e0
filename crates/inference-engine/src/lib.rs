//! Severity Inference Engine
//!
//! Classifies feature vectors into severity levels, either with a trained ONNX
//! model executed by tract or with the rule-based fallback. The mode is chosen
//! once at startup.

mod engine;
mod onnx;

pub use engine::{Classification, ClassifierMode, LearnedModel, SeverityClassifier};
pub use onnx::load_onnx_model;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid model output: expected {expected} probabilities, got {actual}")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("Model produced a non-finite probability at index {0}")]
    NonFiniteProbability(usize),
}
