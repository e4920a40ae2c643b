use crate::activation::sigmoid;

/// Binary cross-entropy on a single logit. Labels may be soft (any value in [0, 1]).
pub struct SigmoidCrossEntropyLoss;

impl SigmoidCrossEntropyLoss {
    /// −[y·log σ(z) + (1−y)·log(1−σ(z))], written as
    ///   max(z, 0) − z·y + ln(1 + e^{−|z|})
    /// so that neither the exponential nor the logarithm can overflow.
    pub fn loss(logits: &[f64], labels: &[f64]) -> f64 {
        logits.iter().zip(labels.iter())
            .map(|(&z, &y)| z.max(0.0) - z * y + (-z.abs()).exp().ln_1p())
            .sum()
    }

    /// ∂L/∂z = σ(z) − y
    pub fn derivative(logits: &[f64], labels: &[f64]) -> Vec<f64> {
        logits.iter().zip(labels.iter())
            .map(|(&z, &y)| sigmoid(z) - y)
            .collect()
    }
}
