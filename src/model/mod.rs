pub mod baseline;
pub mod checkpoint;

pub use baseline::BaselineModel;
pub use checkpoint::{Checkpoint, Variable, BIAS_NAME, GLOBAL_STEP_NAME};
