pub mod activation;

pub use activation::{argmax, log_sum_exp, sigmoid, softmax, Activation};
