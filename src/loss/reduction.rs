/// Per-example losses paired with their weights, reduced on demand.
#[derive(Debug, Clone, Default)]
pub struct WeightedLoss {
    pub per_example: Vec<f64>,
    pub weights: Vec<f64>,
}

impl WeightedLoss {
    pub fn new(per_example: Vec<f64>, weights: Vec<f64>) -> Self {
        debug_assert_eq!(per_example.len(), weights.len());
        WeightedLoss { per_example, weights }
    }

    pub fn len(&self) -> usize {
        self.per_example.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_example.is_empty()
    }

    /// Σ w·l
    pub fn sum(&self) -> f64 {
        self.per_example.iter().zip(self.weights.iter())
            .map(|(l, w)| w * l)
            .sum()
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Σ w·l / batch size. This is the training loss.
    pub fn sum_over_batch_size(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.sum() / self.len() as f64
    }

    /// Σ w·l / Σ w, or 0 when every weight is zero.
    pub fn weighted_mean(&self) -> f64 {
        let sw = self.weight_sum();
        if sw > 0.0 { self.sum() / sw } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn weighted_regression_batch() {
        let wl = WeightedLoss::new(vec![9.0, 9.0], vec![1.0, 2.0]);
        assert_eq!(wl.sum(), 27.0);
        assert_eq!(wl.sum_over_batch_size(), 13.5);
        assert_eq!(wl.weighted_mean(), 9.0);
    }

    #[test]
    fn weighted_classification_batch() {
        let wl = WeightedLoss::new(vec![1.3133, 0.3132], vec![1.0, 2.0]);
        assert_abs_diff_eq!(wl.weighted_mean(), (1.3133 + 2.0 * 0.3132) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_weights_reduce_to_zero() {
        let wl = WeightedLoss::new(vec![5.0], vec![0.0]);
        assert_eq!(wl.weighted_mean(), 0.0);
        assert_eq!(wl.sum_over_batch_size(), 0.0);
    }
}
