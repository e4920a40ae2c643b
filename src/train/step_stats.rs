use serde::{Serialize, Deserialize};

/// Statistics for one completed training step.
///
/// When `TrainConfig::progress_tx` is set, `train` sends one `StepStats` per
/// step. Dropping the receiver stops training early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    /// Global step after this update.
    pub global_step: u64,
    /// Training loss of the batch (Σ w·l / batch size).
    pub loss: f64,
    /// Examples in the batch.
    pub batch_size: usize,
    /// Wall-clock duration of the step in microseconds.
    pub elapsed_us: u64,
}
