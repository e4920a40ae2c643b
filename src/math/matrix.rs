use serde::{Serialize, Deserialize};

use crate::error::{BaselineError, Result};

/// Row-major dense matrix. One row per example, one column per value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from rows. Panics on ragged input; use `try_from_data`
    /// for data that has not been validated yet.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        match Matrix::try_from_data(data) {
            Ok(m) => m,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = data.first().map_or(0, |row| row.len());
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(BaselineError::ShapeMismatch {
                name: "matrix row".to_string(),
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// One value per row, i.e. shape (n, 1).
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Repeats `row` `rows` times: shape (rows, row.len()).
    pub fn broadcast_row(row: &[f64], rows: usize) -> Matrix {
        Matrix {
            rows,
            cols: row.len(),
            data: vec![row.to_vec(); rows],
        }
    }

    pub fn shape(&self) -> Vec<usize> {
        vec![self.rows, self.cols]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(|row| row.as_slice())
    }

    /// Flattens a single-column matrix into a vector.
    pub fn to_column_vec(&self) -> Option<Vec<f64>> {
        if self.cols != 1 {
            return None;
        }
        Some(self.data.iter().map(|row| row[0]).collect())
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_repeats_row() {
        let m = Matrix::broadcast_row(&[10.0, 5.0], 2);
        assert_eq!(m.shape(), vec![2, 2]);
        assert_eq!(m.row(1), &[10.0, 5.0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::try_from_data(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(err, Err(BaselineError::ShapeMismatch { .. })));
    }

    #[test]
    fn empty_matrix_has_no_columns() {
        let m = Matrix::try_from_data(vec![]).unwrap();
        assert_eq!((m.rows, m.cols), (0, 0));
    }

    #[test]
    fn column_round_trips() {
        let m = Matrix::column(&[1.0, 2.0]);
        assert_eq!(m.to_column_vec(), Some(vec![1.0, 2.0]));
        assert_eq!(Matrix::zeros(2, 2).to_column_vec(), None);
    }
}
