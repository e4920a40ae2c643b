pub mod step_stats;
pub mod train_config;
pub mod estimator_config;
pub mod estimator;

pub use step_stats::StepStats;
pub use train_config::{RunConfig, TrainConfig};
pub use estimator_config::EstimatorConfig;
pub use estimator::BaselineEstimator;
