pub mod onnx;

use crate::domain::features::FeatureRow;
use crate::domain::recommendation::TickerError;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model produced an unusable output: {0}")]
    UnexpectedOutput(String),
}

impl From<ClassifierError> for TickerError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::Inference(msg) => TickerError::Inference(msg),
            ClassifierError::UnexpectedOutput(msg) => TickerError::UnexpectedOutput(msg),
        }
    }
}

/// Pre-trained multiclass model.
///
/// Loaded once per process and only read afterwards, so one instance is shared by every
/// ticker evaluation. The returned label is not restricted to `0..=2`.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> Result<i64, ClassifierError>;
}
