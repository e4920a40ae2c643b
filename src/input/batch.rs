use std::collections::BTreeMap;

use crate::error::{BaselineError, Result};
use crate::math::matrix::Matrix;

/// Named feature columns; every column holds one row per example.
pub type FeatureMap = BTreeMap<String, Matrix>;

/// Labels as supplied by the caller, before the head validates them.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// Numeric labels, one row per example.
    Dense(Matrix),
    /// String labels, resolved through a label vocabulary.
    Text(Vec<String>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Dense(m) => m.rows,
            Labels::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps only the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Labels {
        match self {
            Labels::Dense(m) => Labels::Dense(select_rows(m, indices)),
            Labels::Text(v) => Labels::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// One batch of examples. Features are carried along for weight lookup and
/// batch sizing; the baseline model never reads their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub features: FeatureMap,
    pub labels: Option<Labels>,
}

impl Batch {
    pub fn new() -> Self {
        Batch::default()
    }

    pub fn with_feature(mut self, key: impl Into<String>, values: Matrix) -> Self {
        self.features.insert(key.into(), values);
        self
    }

    pub fn with_labels(mut self, labels: Matrix) -> Self {
        self.labels = Some(Labels::Dense(labels));
        self
    }

    pub fn with_text_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(Labels::Text(labels));
        self
    }

    /// Number of examples. All features and the labels must agree.
    pub fn batch_size(&self) -> Result<usize> {
        let mut size: Option<(String, usize)> = None;
        let sizes = self.features.iter()
            .map(|(k, m)| (k.clone(), m.rows))
            .chain(self.labels.iter().map(|l| ("labels".to_string(), l.len())));

        for (name, rows) in sizes {
            match &size {
                None => size = Some((name, rows)),
                Some((_, expected)) if *expected != rows => {
                    return Err(BaselineError::ShapeMismatch {
                        name,
                        expected: vec![*expected],
                        got: vec![rows],
                    });
                }
                Some(_) => {}
            }
        }

        match size {
            Some((_, 0)) | None => Err(BaselineError::EmptyBatch),
            Some((_, n)) => Ok(n),
        }
    }

    /// Per-example weights read from `weight_column`, or all ones.
    pub fn weights(&self, weight_column: Option<&str>) -> Result<Vec<f64>> {
        let n = self.batch_size()?;
        let Some(column) = weight_column else {
            return Ok(vec![1.0; n]);
        };

        let values = self.features.get(column)
            .ok_or_else(|| BaselineError::MissingFeature(column.to_string()))?;
        let weights = values.to_column_vec().ok_or_else(|| BaselineError::ShapeMismatch {
            name: column.to_string(),
            expected: vec![n, 1],
            got: values.shape(),
        })?;

        if let Some((row, &value)) = weights.iter().enumerate().find(|(_, w)| !(**w >= 0.0)) {
            return Err(BaselineError::NegativeWeight { row, value });
        }
        Ok(weights)
    }

    /// Keeps only the examples at `indices`.
    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            features: self.features.iter()
                .map(|(k, m)| (k.clone(), select_rows(m, indices)))
                .collect(),
            labels: self.labels.as_ref().map(|l| l.select(indices)),
        }
    }
}

fn select_rows(m: &Matrix, indices: &[usize]) -> Matrix {
    Matrix {
        rows: indices.len(),
        cols: m.cols,
        data: indices.iter().map(|&i| m.data[i].clone()).collect(),
    }
}
