//! Weighted confusion matrices at fixed probability thresholds, and the
//! precision / recall / AUC values derived from them.

/// Offset that pushes the first and last thresholds just outside [0, 1].
const KEPSILON: f64 = 1e-7;

/// `a / b`, or 0 when `b` is 0.
fn div_no_nan(a: f64, b: f64) -> f64 {
    if b == 0.0 { 0.0 } else { a / b }
}

#[derive(Debug, Clone)]
pub struct ThresholdConfusion {
    thresholds: Vec<f64>,
    tp: Vec<f64>,
    fp: Vec<f64>,
    tn: Vec<f64>,
    fn_: Vec<f64>,
}

impl ThresholdConfusion {
    pub fn new(thresholds: Vec<f64>) -> Self {
        let n = thresholds.len();
        ThresholdConfusion {
            thresholds,
            tp: vec![0.0; n],
            fp: vec![0.0; n],
            tn: vec![0.0; n],
            fn_: vec![0.0; n],
        }
    }

    /// `num_thresholds` evenly spaced thresholds covering [-ε, 1+ε].
    pub fn evenly_spaced(num_thresholds: usize) -> Self {
        assert!(num_thresholds > 1, "need at least two thresholds");
        let inner = (1..num_thresholds - 1)
            .map(|i| i as f64 / (num_thresholds - 1) as f64);
        let thresholds = std::iter::once(-KEPSILON)
            .chain(inner)
            .chain(std::iter::once(1.0 + KEPSILON))
            .collect();
        ThresholdConfusion::new(thresholds)
    }

    /// Records one example. A prediction counts as positive when it is
    /// strictly above the threshold; any non-zero label is positive.
    pub fn update(&mut self, prediction: f64, label: f64, weight: f64) {
        let positive = label != 0.0;
        for (i, &t) in self.thresholds.iter().enumerate() {
            match (prediction > t, positive) {
                (true, true) => self.tp[i] += weight,
                (true, false) => self.fp[i] += weight,
                (false, false) => self.tn[i] += weight,
                (false, true) => self.fn_[i] += weight,
            }
        }
    }

    /// tp / (tp + fp) at threshold index `i`.
    pub fn precision(&self, i: usize) -> f64 {
        div_no_nan(self.tp[i], self.tp[i] + self.fp[i])
    }

    /// tp / (tp + fn) at threshold index `i`.
    pub fn recall(&self, i: usize) -> f64 {
        div_no_nan(self.tp[i], self.tp[i] + self.fn_[i])
    }

    /// Area under the ROC curve, trapezoidal rule.
    pub fn roc_auc(&self) -> f64 {
        let n = self.thresholds.len();
        let tpr: Vec<f64> = (0..n).map(|i| self.recall(i)).collect();
        let fpr: Vec<f64> = (0..n)
            .map(|i| div_no_nan(self.fp[i], self.fp[i] + self.tn[i]))
            .collect();
        (0..n - 1)
            .map(|i| (fpr[i] - fpr[i + 1]) * (tpr[i] + tpr[i + 1]) / 2.0)
            .sum()
    }

    /// Area under the precision-recall curve.
    ///
    /// Between two thresholds precision is interpolated along the line the
    /// true positives follow as predicted positives grow (Davis & Goadrich),
    /// rather than linearly in precision.
    pub fn pr_auc(&self) -> f64 {
        let n = self.thresholds.len();
        let p: Vec<f64> = (0..n).map(|i| self.tp[i] + self.fp[i]).collect();
        (0..n - 1)
            .map(|i| {
                let dtp = self.tp[i] - self.tp[i + 1];
                let dp = p[i] - p[i + 1];
                let slope = div_no_nan(dtp, dp.max(0.0));
                let intercept = self.tp[i + 1] - slope * p[i + 1];
                let ratio = if p[i] > 0.0 && p[i + 1] > 0.0 {
                    div_no_nan(p[i], p[i + 1])
                } else {
                    1.0
                };
                let area = slope * (dtp + intercept * ratio.ln());
                div_no_nan(area, (self.tp[i + 1] + self.fn_[i + 1]).max(0.0))
            })
            .sum()
    }
}
