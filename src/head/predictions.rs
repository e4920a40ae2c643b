use serde::{Serialize, Deserialize};

use crate::activation::{argmax, sigmoid, Activation};
use crate::head::head::Head;

/// Output of a regression head for one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionPrediction {
    pub predictions: Vec<f64>,
}

/// Output of a classification head for one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    pub logits: Vec<f64>,
    /// σ(logit); binary heads only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistic: Option<Vec<f64>>,
    pub probabilities: Vec<f64>,
    pub class_ids: Vec<usize>,
    pub classes: Vec<String>,
    pub all_class_ids: Vec<usize>,
    pub all_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Regression(RegressionPrediction),
    Classification(ClassPrediction),
}

impl Prediction {
    pub fn as_regression(&self) -> Option<&RegressionPrediction> {
        match self {
            Prediction::Regression(p) => Some(p),
            Prediction::Classification(_) => None,
        }
    }

    pub fn as_classification(&self) -> Option<&ClassPrediction> {
        match self {
            Prediction::Classification(p) => Some(p),
            Prediction::Regression(_) => None,
        }
    }
}

impl Head {
    /// Builds the prediction for one row of logits.
    pub fn predict(&self, logits: &[f64]) -> Prediction {
        match self {
            Head::Regression { .. } => Prediction::Regression(RegressionPrediction {
                predictions: logits.to_vec(),
            }),
            Head::BinaryClassification { .. } => {
                let z = logits[0];
                let class_id = usize::from(z > 0.0);
                Prediction::Classification(ClassPrediction {
                    logits: vec![z],
                    logistic: Some(vec![sigmoid(z)]),
                    // Two-class convention: the negative class has logit 0.
                    probabilities: Activation::Softmax.apply(&[0.0, z]),
                    class_ids: vec![class_id],
                    classes: vec![self.class_name(class_id)],
                    all_class_ids: vec![0, 1],
                    all_classes: self.all_class_names(),
                })
            }
            Head::MultiClassification { n_classes, .. } => {
                let class_id = argmax(logits);
                Prediction::Classification(ClassPrediction {
                    logits: logits.to_vec(),
                    logistic: None,
                    probabilities: Activation::Softmax.apply(logits),
                    class_ids: vec![class_id],
                    classes: vec![self.class_name(class_id)],
                    all_class_ids: (0..*n_classes).collect(),
                    all_classes: self.all_class_names(),
                })
            }
        }
    }

    /// Vocabulary entry for `id`, or the stringified id.
    pub fn class_name(&self, id: usize) -> String {
        match self.label_vocabulary() {
            Some(vocab) => vocab[id].clone(),
            None => id.to_string(),
        }
    }

    fn all_class_names(&self) -> Vec<String> {
        (0..self.n_classes()).map(|id| self.class_name(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn binary_prediction_layout() {
        let head = Head::classifier(2, None).unwrap();
        let p = head.predict(&[10.0]);
        let p = p.as_classification().unwrap();
        assert_eq!(p.class_ids, vec![1]);
        assert_eq!(p.classes, vec!["1".to_string()]);
        assert_eq!(p.all_classes, vec!["0".to_string(), "1".to_string()]);
        assert_abs_diff_eq!(p.logistic.as_ref().unwrap()[0], sigmoid(10.0), epsilon = 1e-12);
        assert_abs_diff_eq!(p.probabilities[1], sigmoid(10.0), epsilon = 1e-12);
        assert_abs_diff_eq!(p.probabilities[0] + p.probabilities[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_logit_predicts_negative_class() {
        let head = Head::classifier(2, None).unwrap();
        assert_eq!(head.predict(&[0.0]).as_classification().unwrap().class_ids, vec![0]);
    }

    #[test]
    fn multi_class_uses_vocabulary() {
        let vocab: Vec<String> = (0..4).map(|i| format!("class_vocab_{i}")).collect();
        let head = Head::classifier(4, Some(vocab.clone())).unwrap();
        let p = head.predict(&[10.0; 4]);
        let p = p.as_classification().unwrap();
        assert_eq!(p.class_ids, vec![0]);
        assert_eq!(p.classes, vec!["class_vocab_0".to_string()]);
        assert_eq!(p.all_classes, vocab);
        assert!(p.logistic.is_none());
        assert_abs_diff_eq!(p.probabilities[2], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn regression_echoes_logits() {
        let head = Head::regression(3).unwrap();
        let p = head.predict(&[0.2, 0.4, 0.6]);
        assert_eq!(p.as_regression().unwrap().predictions, vec![0.2, 0.4, 0.6]);
    }
}
