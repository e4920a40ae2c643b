use serde::{Serialize, Deserialize};

/// Output transform applied to a row of logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    /// Element-wise logistic function.
    Sigmoid,
    /// Vector-valued; normalizes the whole row.
    Softmax,
}

impl Activation {
    pub fn apply(&self, logits: &[f64]) -> Vec<f64> {
        match self {
            Activation::Identity => logits.to_vec(),
            Activation::Sigmoid => logits.iter().map(|&z| sigmoid(z)).collect(),
            Activation::Softmax => softmax(logits),
        }
    }
}

/// Logistic function, evaluated so that `exp` never overflows.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// ln(Σ exp(z_i)), shifted by the maximum for stability.
pub fn log_sum_exp(logits: &[f64]) -> f64 {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = logits.iter().map(|&z| (z - max).exp()).sum();
    max + sum.ln()
}

pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let lse = log_sum_exp(logits);
    logits.iter().map(|&z| (z - lse).exp()).collect()
}

/// Index of the maximum element; the first one wins on ties.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}
