use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};
use crate::loss::{LossType, WeightedLoss};
use crate::math::matrix::Matrix;

/// The task a baseline model is trained for. Selects the loss, the metric
/// bundle and the prediction layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Head {
    Regression {
        label_dimension: usize,
    },
    /// Two classes on a single logit.
    BinaryClassification {
        #[serde(default)]
        label_vocabulary: Option<Vec<String>>,
    },
    MultiClassification {
        n_classes: usize,
        #[serde(default)]
        label_vocabulary: Option<Vec<String>>,
    },
}

impl Head {
    pub fn regression(label_dimension: usize) -> Result<Head> {
        let head = Head::Regression { label_dimension };
        head.validate()?;
        Ok(head)
    }

    /// Binary head for `n_classes == 2`, multi-class head above that.
    pub fn classifier(n_classes: usize, label_vocabulary: Option<Vec<String>>) -> Result<Head> {
        if n_classes < 2 {
            return Err(BaselineError::InvalidConfig(format!(
                "a classifier needs at least 2 classes, got {n_classes}"
            )));
        }
        let head = if n_classes == 2 {
            Head::BinaryClassification { label_vocabulary }
        } else {
            Head::MultiClassification { n_classes, label_vocabulary }
        };
        head.validate()?;
        Ok(head)
    }

    /// Checks invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<()> {
        match self {
            Head::Regression { label_dimension } if *label_dimension == 0 => {
                Err(BaselineError::InvalidConfig("label_dimension must be at least 1".into()))
            }
            Head::MultiClassification { n_classes, .. } if *n_classes < 3 => {
                Err(BaselineError::InvalidConfig(format!(
                    "a multi-class head needs at least 3 classes, got {n_classes}"
                )))
            }
            _ => {
                if let Some(vocab) = self.label_vocabulary() {
                    if vocab.len() != self.n_classes() {
                        return Err(BaselineError::InvalidConfig(format!(
                            "label_vocabulary has {} entries but n_classes is {}",
                            vocab.len(),
                            self.n_classes()
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Head::Regression { .. } => "regression",
            Head::BinaryClassification { .. } => "binary_classification",
            Head::MultiClassification { .. } => "multi_class_classification",
        }
    }

    /// Length of the bias vector.
    pub fn logits_dimension(&self) -> usize {
        match self {
            Head::Regression { label_dimension } => *label_dimension,
            Head::BinaryClassification { .. } => 1,
            Head::MultiClassification { n_classes, .. } => *n_classes,
        }
    }

    /// Number of classes; 0 for regression.
    pub fn n_classes(&self) -> usize {
        match self {
            Head::Regression { .. } => 0,
            Head::BinaryClassification { .. } => 2,
            Head::MultiClassification { n_classes, .. } => *n_classes,
        }
    }

    pub fn label_vocabulary(&self) -> Option<&[String]> {
        match self {
            Head::Regression { .. } => None,
            Head::BinaryClassification { label_vocabulary }
            | Head::MultiClassification { label_vocabulary, .. } => label_vocabulary.as_deref(),
        }
    }

    pub fn loss_type(&self) -> LossType {
        match self {
            Head::Regression { .. } => LossType::SquaredError,
            Head::BinaryClassification { .. } => LossType::SigmoidCrossEntropy,
            Head::MultiClassification { .. } => LossType::SoftmaxCrossEntropy,
        }
    }

    /// Per-example losses for processed `targets` (see `process_labels`).
    pub fn loss(&self, logits: &Matrix, targets: &Matrix, weights: &[f64]) -> WeightedLoss {
        let loss_type = self.loss_type();
        let per_example = logits.iter_rows()
            .zip(targets.iter_rows())
            .map(|(z, y)| loss_type.loss(z, y))
            .collect();
        WeightedLoss::new(per_example, weights.to_vec())
    }

    /// Gradient of the training loss (Σ w·l / n) w.r.t. the bias.
    ///
    /// Every logit row is the bias, so the per-row gradients simply add up.
    pub fn bias_gradient(&self, logits: &Matrix, targets: &Matrix, weights: &[f64]) -> Vec<f64> {
        let loss_type = self.loss_type();
        let mut grad = vec![0.0; logits.cols];
        for ((z, y), w) in logits.iter_rows().zip(targets.iter_rows()).zip(weights) {
            for (g, d) in grad.iter_mut().zip(loss_type.derivative(z, y)) {
                *g += w * d;
            }
        }
        let n = logits.rows.max(1) as f64;
        grad.iter_mut().for_each(|g| *g /= n);
        grad
    }
}
