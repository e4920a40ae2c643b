pub mod head;
pub mod labels;
pub mod predictions;

pub use head::Head;
pub use predictions::{ClassPrediction, Prediction, RegressionPrediction};
