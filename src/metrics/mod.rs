//! Evaluation metrics.
//!
//! Every metric honors per-example weights: weighted sums divided by the sum
//! of weights, 0 when that sum is 0.

pub mod keys;
pub mod mean;
pub mod confusion;
pub mod evaluator;

pub use confusion::ThresholdConfusion;
pub use evaluator::{Metrics, MetricsAccumulator};
pub use mean::WeightedMean;
