use crate::domain::features::{FeatureRow, FEATURE_COUNT};
use crate::model::{Classifier, ClassifierError};
use anyhow::Context;
use std::path::Path;
use tract_onnx::prelude::*;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX export of the multiclass model (exported without the zipmap post-processor).
pub struct OnnxClassifier {
    plan: RunnableModel,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier").finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        anyhow::ensure!(path.exists(), "model artifact not found at {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .with_context(|| format!("failed to load ONNX model from {}", path.display()))?;

        tracing::info!(path = %path.display(), features = FEATURE_COUNT, "loaded classifier");
        Ok(Self { plan })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, row: &FeatureRow) -> Result<i64, ClassifierError> {
        let input = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), row.to_f32_vec())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?
            .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ClassifierError::Inference(format!("{e:#}")))?;
        let label = outputs
            .first()
            .ok_or_else(|| ClassifierError::UnexpectedOutput("model returned no outputs".into()))?;

        decode_label(label)
    }
}

/// Reads a class from the first output: an integer label tensor, a single float label, or a
/// row of per-class scores (arg-max).
fn decode_label(tensor: &Tensor) -> Result<i64, ClassifierError> {
    if let Ok(view) = tensor.to_array_view::<i64>() {
        return view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ClassifierError::UnexpectedOutput("empty label tensor".into()));
    }
    if let Ok(view) = tensor.to_array_view::<i32>() {
        return view
            .iter()
            .next()
            .map(|v| *v as i64)
            .ok_or_else(|| ClassifierError::UnexpectedOutput("empty label tensor".into()));
    }
    if let Ok(view) = tensor.to_array_view::<f32>() {
        let scores: Vec<f32> = view.iter().copied().collect();
        return match scores.as_slice() {
            [] => Err(ClassifierError::UnexpectedOutput("empty label tensor".into())),
            [single] if single.is_finite() => Ok(single.round() as i64),
            [single] => Err(ClassifierError::UnexpectedOutput(format!("non-finite label {single}"))),
            many => argmax(many)
                .map(|i| i as i64)
                .ok_or_else(|| ClassifierError::UnexpectedOutput("non-finite class scores".into())),
        };
    }

    Err(ClassifierError::UnexpectedOutput(format!(
        "unsupported output type {:?}",
        tensor.datum_type()
    )))
}

fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}
