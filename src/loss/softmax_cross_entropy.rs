use crate::activation::{log_sum_exp, softmax};

/// Categorical cross-entropy over a row of logits with an integer class label.
pub struct SoftmaxCrossEntropyLoss;

impl SoftmaxCrossEntropyLoss {
    /// −log softmax(z)[class] = logsumexp(z) − z[class]
    ///
    /// `class` must already be validated to lie in `0..logits.len()`.
    pub fn loss(logits: &[f64], class: usize) -> f64 {
        log_sum_exp(logits) - logits[class]
    }

    /// ∂L/∂z_i = softmax(z)_i − [i == class]
    pub fn derivative(logits: &[f64], class: usize) -> Vec<f64> {
        let mut grad = softmax(logits);
        grad[class] -= 1.0;
        grad
    }
}
