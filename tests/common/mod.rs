//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use ferrite_baseline::model::BIAS_NAME;
use ferrite_baseline::{Batch, Checkpoint, Matrix, Optimizer};

/// Writes a checkpoint holding `bias` at `global_step`.
pub fn save_checkpoint(model_dir: &Path, bias: &[f64], global_step: u64) {
    Checkpoint::new(global_step)
        .with_variable(BIAS_NAME, bias.to_vec())
        .save(model_dir)
        .unwrap();
}

/// A batch with an `age` feature and numeric labels, one row per label row.
pub fn labeled_batch(labels: Vec<Vec<f64>>) -> Batch {
    let n = labels.len();
    Batch::new()
        .with_feature("age", Matrix::column(&vec![17.0; n]))
        .with_labels(Matrix::from_data(labels))
}

/// Optimizer that records what it was given and leaves the parameters alone.
#[derive(Clone, Default)]
pub struct RecordingOptimizer {
    pub losses: Arc<Mutex<Vec<f64>>>,
    pub grads: Arc<Mutex<Vec<Vec<f64>>>>,
}

impl Optimizer for RecordingOptimizer {
    fn name(&self) -> &str {
        "recording"
    }

    fn apply_gradients(&mut self, loss: f64, _params: &mut [f64], grads: &[f64]) {
        self.losses.lock().unwrap().push(loss);
        self.grads.lock().unwrap().push(grads.to_vec());
    }
}
