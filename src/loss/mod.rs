pub mod squared_error;
pub mod sigmoid_cross_entropy;
pub mod softmax_cross_entropy;
pub mod loss_type;
pub mod reduction;

pub use squared_error::SquaredErrorLoss;
pub use sigmoid_cross_entropy::SigmoidCrossEntropyLoss;
pub use softmax_cross_entropy::SoftmaxCrossEntropyLoss;
pub use loss_type::LossType;
pub use reduction::WeightedLoss;
