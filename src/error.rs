use std::io;
use std::path::PathBuf;

/// Errors produced by the baseline estimator and its persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no checkpoint found in {0}")]
    MissingCheckpoint(PathBuf),

    #[error("variable not found in checkpoint: {0}")]
    MissingVariable(String),

    #[error("shape mismatch for {name}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("missing feature: {0}")]
    MissingFeature(String),

    #[error("labels are required for {0}")]
    MissingLabels(&'static str),

    #[error("invalid label at row {row}: {reason}")]
    InvalidLabel { row: usize, reason: String },

    #[error("weight at row {row} must be non-negative, got {value}")]
    NegativeWeight { row: usize, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("loss is not finite at step {step}: {loss}")]
    NonFiniteLoss { step: u64, loss: f64 },

    #[error("malformed example {index}: {reason}")]
    MalformedExample { index: usize, reason: String },

    #[error("batch is empty")]
    EmptyBatch,
}

pub type Result<T> = std::result::Result<T, BaselineError>;
