/// Squared error summed over output dimensions.
pub struct SquaredErrorLoss;

impl SquaredErrorLoss {
    /// Per-example loss: Σ_d (logit_d − label_d)²
    pub fn loss(logits: &[f64], labels: &[f64]) -> f64 {
        logits.iter().zip(labels.iter())
            .map(|(z, y)| (z - y).powi(2))
            .sum()
    }

    /// Per-output gradient w.r.t. the logits: 2·(logit − label)
    pub fn derivative(logits: &[f64], labels: &[f64]) -> Vec<f64> {
        logits.iter().zip(labels.iter())
            .map(|(z, y)| 2.0 * (z - y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_thirteen_label_ten() {
        assert_eq!(SquaredErrorLoss::loss(&[13.0], &[10.0]), 9.0);
        assert_eq!(SquaredErrorLoss::derivative(&[13.0], &[10.0]), vec![6.0]);
    }

    #[test]
    fn sums_over_dimensions() {
        assert_eq!(SquaredErrorLoss::loss(&[46.0, 58.0], &[46.0, 58.0]), 0.0);
        assert_eq!(SquaredErrorLoss::loss(&[1.0, 2.0], &[0.0, 0.0]), 5.0);
    }
}
