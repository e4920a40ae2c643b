use std::collections::BTreeMap;

use crate::activation::{argmax, sigmoid};
use crate::head::Head;
use crate::loss::WeightedLoss;
use crate::math::matrix::Matrix;
use crate::metrics::confusion::ThresholdConfusion;
use crate::metrics::keys;
use crate::metrics::mean::WeightedMean;

/// Metric name → value, as returned by `evaluate`.
pub type Metrics = BTreeMap<String, f64>;

const AUC_NUM_THRESHOLDS: usize = 200;
const CLASS_THRESHOLD: f64 = 0.5;

/// Accumulates the metric bundle of a head over any number of batches.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    head: Head,
    loss: WeightedMean,
    average_loss: WeightedMean,
    prediction_mean: WeightedMean,
    label_mean: WeightedMean,
    accuracy: WeightedMean,
    at_threshold: ThresholdConfusion,
    curve: ThresholdConfusion,
}

impl MetricsAccumulator {
    pub fn new(head: &Head) -> Self {
        MetricsAccumulator {
            head: head.clone(),
            loss: WeightedMean::default(),
            average_loss: WeightedMean::default(),
            prediction_mean: WeightedMean::default(),
            label_mean: WeightedMean::default(),
            accuracy: WeightedMean::default(),
            at_threshold: ThresholdConfusion::new(vec![CLASS_THRESHOLD]),
            curve: ThresholdConfusion::evenly_spaced(AUC_NUM_THRESHOLDS),
        }
    }

    /// Folds in one batch. `targets` are the processed labels and `loss` the
    /// per-example losses the head computed for them.
    pub fn update(&mut self, logits: &Matrix, targets: &Matrix, weights: &[f64], loss: &WeightedLoss) {
        // One entry per batch, unweighted: `loss` is the mean training loss.
        self.loss.update(loss.sum_over_batch_size(), 1.0);
        for (l, &w) in loss.per_example.iter().zip(weights) {
            self.average_loss.update(*l, w);
        }

        let rows = logits.iter_rows().zip(targets.iter_rows()).zip(weights);
        match &self.head {
            Head::Regression { .. } => {
                for ((z, y), &w) in rows {
                    z.iter().for_each(|&v| self.prediction_mean.update(v, w));
                    y.iter().for_each(|&v| self.label_mean.update(v, w));
                }
            }
            Head::BinaryClassification { .. } => {
                for ((z, y), &w) in rows {
                    let (p, label) = (sigmoid(z[0]), y[0]);
                    let class_id = if z[0] > 0.0 { 1.0 } else { 0.0 };
                    self.prediction_mean.update(p, w);
                    self.label_mean.update(label, w);
                    self.accuracy.update(if class_id == label { 1.0 } else { 0.0 }, w);
                    self.at_threshold.update(p, label, w);
                    self.curve.update(p, label, w);
                }
            }
            Head::MultiClassification { .. } => {
                for ((z, y), &w) in rows {
                    let correct = argmax(z) as f64 == y[0];
                    self.accuracy.update(if correct { 1.0 } else { 0.0 }, w);
                }
            }
        }
    }

    pub fn finish(&self, global_step: u64) -> Metrics {
        let mut m = Metrics::new();
        m.insert(keys::LOSS.into(), self.loss.result());
        m.insert(keys::LOSS_MEAN.into(), self.average_loss.result());
        m.insert(keys::GLOBAL_STEP.into(), global_step as f64);

        match &self.head {
            Head::Regression { .. } => {
                m.insert(keys::PREDICTION_MEAN.into(), self.prediction_mean.result());
                m.insert(keys::LABEL_MEAN.into(), self.label_mean.result());
            }
            Head::BinaryClassification { .. } => {
                let label_mean = self.label_mean.result();
                m.insert(keys::PREDICTION_MEAN.into(), self.prediction_mean.result());
                m.insert(keys::LABEL_MEAN.into(), label_mean);
                m.insert(keys::ACCURACY.into(), self.accuracy.result());
                m.insert(keys::ACCURACY_BASELINE.into(), label_mean.max(1.0 - label_mean));
                m.insert(keys::PRECISION.into(), self.at_threshold.precision(0));
                m.insert(keys::RECALL.into(), self.at_threshold.recall(0));
                m.insert(keys::AUC.into(), self.curve.roc_auc());
                m.insert(keys::AUC_PR.into(), self.curve.pr_auc());
            }
            Head::MultiClassification { .. } => {
                m.insert(keys::ACCURACY.into(), self.accuracy.result());
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn run(head: &Head, bias: &[f64], labels: &[f64], weights: &[f64]) -> Metrics {
        let logits = Matrix::broadcast_row(bias, labels.len());
        let targets = Matrix::column(labels);
        let loss = head.loss(&logits, &targets, weights);
        let mut acc = MetricsAccumulator::new(head);
        acc.update(&logits, &targets, weights, &loss);
        acc.finish(100)
    }

    #[test]
    fn regression_bundle_keys() {
        let m = run(&Head::regression(1).unwrap(), &[13.0], &[10.0, 10.0], &[1.0, 2.0]);
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["average_loss", "global_step", "label/mean", "loss", "prediction/mean"]);
        assert_eq!(m["loss"], 13.5);
        assert_eq!(m["average_loss"], 9.0);
        assert_eq!(m["prediction/mean"], 13.0);
        assert_eq!(m["label/mean"], 10.0);
    }

    #[test]
    fn binary_weighted_bundle() {
        let m = run(&Head::classifier(2, None).unwrap(), &[-1.0], &[1.0, 0.0], &[1.0, 2.0]);
        assert_abs_diff_eq!(m[keys::LOSS], (1.3133 + 2.0 * 0.3132) / 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(m[keys::LOSS_MEAN], (1.3133 + 2.0 * 0.3132) / 3.0, epsilon = 1e-3);
        assert_abs_diff_eq!(m[keys::ACCURACY], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m[keys::LABEL_MEAN], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m[keys::ACCURACY_BASELINE], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m[keys::PREDICTION_MEAN], 0.2689, epsilon = 1e-4);
        assert_eq!(m[keys::PRECISION], 0.0);
        assert_eq!(m[keys::RECALL], 0.0);
        assert_abs_diff_eq!(m[keys::AUC], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(m[keys::AUC_PR], 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn multi_class_bundle_is_small() {
        let m = run(&Head::classifier(4, None).unwrap(), &[-1.0; 4], &[1.0, 0.0], &[1.0, 1.0]);
        assert_eq!(m.len(), 4);
        assert_abs_diff_eq!(m[keys::ACCURACY], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m[keys::LOSS], 4.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn loss_is_averaged_over_batches() {
        let head = Head::regression(1).unwrap();
        let mut acc = MetricsAccumulator::new(&head);
        for label in [10.0, 12.0] {
            let logits = Matrix::broadcast_row(&[13.0], 1);
            let targets = Matrix::column(&[label]);
            let loss = head.loss(&logits, &targets, &[1.0]);
            acc.update(&logits, &targets, &[1.0], &loss);
        }
        let m = acc.finish(0);
        assert_eq!(m[keys::LOSS], 5.0);
        assert_eq!(m[keys::LOSS_MEAN], 5.0);
    }
}
