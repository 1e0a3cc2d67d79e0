//! ONNX Model Loading via tract

use std::path::Path;

use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use severity::SeverityLevel;
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::engine::LearnedModel;
use crate::InferenceError;

/// Load an ONNX classifier taking a `[1, 13]` f32 input.
///
/// The probability output is the first f32 output (searching from the last) with
/// exactly one value per severity level, which skips integer label outputs.
pub fn load_onnx_model(path: &Path) -> Result<LearnedModel, InferenceError> {
    info!("Loading ONNX model from {}", path.display());

    let plan = tract_onnx::onnx()
        .model_for_path(path)
        .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into()))
        .and_then(|model| model.into_optimized())
        .and_then(|model| model.into_runnable())
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

    let predict_proba = move |features: &FeatureVector| -> Result<Vec<f64>, InferenceError> {
        let input: Vec<f32> = features.values().iter().map(|v| *v as f32).collect();
        let tensor = Tensor::from_shape(&[1, FEATURE_DIMENSION], &input)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        for output in outputs.iter().rev() {
            if let Ok(view) = output.to_array_view::<f32>() {
                if view.len() == SeverityLevel::COUNT {
                    return Ok(view.iter().map(|p| *p as f64).collect());
                }
            }
        }

        debug!("No probability output among {} model outputs", outputs.len());
        Err(InferenceError::InvalidOutputShape {
            expected: SeverityLevel::COUNT,
            actual: outputs.first().map(|o| o.len()).unwrap_or(0),
        })
    };

    Ok(LearnedModel::new(path.display().to_string(), predict_proba))
}
