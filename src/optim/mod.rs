pub mod optimizer;
pub mod sgd;
pub mod ftrl;

pub use optimizer::{Optimizer, OptimizerConfig};
pub use sgd::Sgd;
pub use ftrl::Ftrl;
