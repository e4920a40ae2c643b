pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod head;
pub mod metrics;
pub mod model;
pub mod optim;
pub mod input;
pub mod train;
pub mod export;

// Convenience re-exports
pub use error::{BaselineError, Result};
pub use math::matrix::Matrix;
pub use head::{Head, Prediction};
pub use input::{ArrayInput, Batch, InputFn, Labels};
pub use metrics::Metrics;
pub use model::Checkpoint;
pub use optim::{Ftrl, Optimizer, OptimizerConfig, Sgd};
pub use train::{BaselineEstimator, EstimatorConfig, TrainConfig};
pub use export::{build_parsing_serving_input_receiver, make_parse_example_spec, SavedModel};
