use serde::{Serialize, Deserialize};

use crate::loss::sigmoid_cross_entropy::SigmoidCrossEntropyLoss;
use crate::loss::softmax_cross_entropy::SoftmaxCrossEntropyLoss;
use crate::loss::squared_error::SquaredErrorLoss;

/// Selects the per-example loss a head trains with.
///
/// - `SquaredError`        — regression; labels have one column per output.
/// - `SigmoidCrossEntropy` — binary classification on a single logit.
/// - `SoftmaxCrossEntropy` — multi-class; the label row holds one class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    SquaredError,
    SigmoidCrossEntropy,
    SoftmaxCrossEntropy,
}

impl LossType {
    /// Scalar loss for one example.
    pub fn loss(&self, logits: &[f64], labels: &[f64]) -> f64 {
        match self {
            LossType::SquaredError        => SquaredErrorLoss::loss(logits, labels),
            LossType::SigmoidCrossEntropy => SigmoidCrossEntropyLoss::loss(logits, labels),
            LossType::SoftmaxCrossEntropy => SoftmaxCrossEntropyLoss::loss(logits, labels[0] as usize),
        }
    }

    /// Gradient of the per-example loss w.r.t. the logits.
    pub fn derivative(&self, logits: &[f64], labels: &[f64]) -> Vec<f64> {
        match self {
            LossType::SquaredError        => SquaredErrorLoss::derivative(logits, labels),
            LossType::SigmoidCrossEntropy => SigmoidCrossEntropyLoss::derivative(logits, labels),
            LossType::SoftmaxCrossEntropy => SoftmaxCrossEntropyLoss::derivative(logits, labels[0] as usize),
        }
    }
}
