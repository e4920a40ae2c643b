use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};
use crate::math::matrix::Matrix;
use crate::model::checkpoint::{Checkpoint, BIAS_NAME};

/// The whole baseline model: one bias entry per logit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineModel {
    pub bias: Vec<f64>,
}

impl BaselineModel {
    /// Zero-initialized bias of length `logits_dimension`.
    pub fn new(logits_dimension: usize) -> BaselineModel {
        BaselineModel { bias: vec![0.0; logits_dimension] }
    }

    pub fn from_bias(bias: Vec<f64>) -> BaselineModel {
        BaselineModel { bias }
    }

    pub fn logits_dimension(&self) -> usize {
        self.bias.len()
    }

    /// Logits for a batch: the bias, repeated once per example. Features are
    /// never read.
    pub fn forward(&self, batch_size: usize) -> Matrix {
        Matrix::broadcast_row(&self.bias, batch_size)
    }

    /// Fails unless the bias has exactly `logits_dimension` entries.
    pub fn check_dimension(&self, logits_dimension: usize) -> Result<()> {
        if self.bias.len() != logits_dimension {
            return Err(BaselineError::ShapeMismatch {
                name: BIAS_NAME.to_string(),
                expected: vec![logits_dimension],
                got: vec![self.bias.len()],
            });
        }
        Ok(())
    }

    /// Reads the bias from a checkpoint and checks it has the expected length.
    pub fn from_checkpoint(checkpoint: &Checkpoint, logits_dimension: usize) -> Result<BaselineModel> {
        let var = checkpoint.variable(BIAS_NAME)?;
        if var.shape != [logits_dimension] {
            return Err(BaselineError::ShapeMismatch {
                name: BIAS_NAME.to_string(),
                expected: vec![logits_dimension],
                got: var.shape.clone(),
            });
        }
        Ok(BaselineModel::from_bias(var.values.clone()))
    }
}
