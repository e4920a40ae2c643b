use crate::error::{BaselineError, Result};
use crate::head::head::Head;
use crate::input::batch::Labels;
use crate::math::matrix::Matrix;

impl Head {
    /// Validates raw labels and converts them to the numeric targets the loss
    /// consumes: the label values for regression, a value in [0, 1] for binary
    /// classification, a class id for multi-class classification.
    pub fn process_labels(&self, labels: &Labels) -> Result<Matrix> {
        match (self, labels) {
            (Head::Regression { label_dimension }, Labels::Dense(m)) => {
                if m.cols != *label_dimension {
                    return Err(BaselineError::ShapeMismatch {
                        name: "labels".into(),
                        expected: vec![m.rows, *label_dimension],
                        got: m.shape(),
                    });
                }
                Ok(m.clone())
            }
            (Head::Regression { .. }, Labels::Text(_)) => Err(BaselineError::InvalidLabel {
                row: 0,
                reason: "regression labels must be numeric".into(),
            }),
            (_, Labels::Text(values)) => self.lookup_vocabulary(values),
            (_, Labels::Dense(m)) => self.check_class_ids(m),
        }
    }

    fn lookup_vocabulary(&self, values: &[String]) -> Result<Matrix> {
        let Some(vocab) = self.label_vocabulary() else {
            return Err(BaselineError::InvalidLabel {
                row: 0,
                reason: "string labels require a label_vocabulary".into(),
            });
        };
        let ids = values.iter().enumerate()
            .map(|(row, v)| {
                vocab.iter()
                    .position(|entry| entry == v)
                    .map(|id| id as f64)
                    .ok_or_else(|| BaselineError::InvalidLabel {
                        row,
                        reason: format!("{v:?} is not in the label vocabulary"),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(Matrix::column(&ids))
    }

    fn check_class_ids(&self, m: &Matrix) -> Result<Matrix> {
        if self.label_vocabulary().is_some() {
            return Err(BaselineError::InvalidLabel {
                row: 0,
                reason: "labels must be strings when a label_vocabulary is set".into(),
            });
        }
        let values = m.to_column_vec().ok_or_else(|| BaselineError::ShapeMismatch {
            name: "labels".into(),
            expected: vec![m.rows, 1],
            got: m.shape(),
        })?;

        let n_classes = self.n_classes();
        for (row, &y) in values.iter().enumerate() {
            let valid = match self {
                Head::BinaryClassification { .. } => (0.0..=1.0).contains(&y),
                _ => y.fract() == 0.0 && y >= 0.0 && y < n_classes as f64,
            };
            if !valid {
                return Err(BaselineError::InvalidLabel {
                    row,
                    reason: format!("{y} is outside the valid range for {n_classes} classes"),
                });
            }
        }
        Ok(m.clone())
    }
}
