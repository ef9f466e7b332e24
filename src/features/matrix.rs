//! The encoded, column-major feature matrix.

use anyhow::{bail, Result};

use crate::features::column::ColumnName;
use crate::models::DesignMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 0/1 membership of a category label
    Indicator,
    /// original indicator minus replacement indicator, in {-1, 0, 1}
    Delta,
    /// imputed and standardized scalar
    Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: ColumnName,
    pub kind: ColumnKind,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: ColumnName, kind: ColumnKind, values: Vec<f64>) -> Self {
        Self { name, kind, values }
    }

    pub fn non_zero_count(&self) -> usize {
        self.values.iter().filter(|&&value| value != 0.0).count()
    }

    /// Indicator and delta columns count as binary when their distinct
    /// values are exactly {0, 1}; standardized scalars never do
    pub fn is_binary(&self) -> bool {
        match self.kind {
            ColumnKind::Scalar => false,
            ColumnKind::Indicator | ColumnKind::Delta => {
                let has_zero = self.values.iter().any(|&v| v == 0.0);
                let has_one = self.values.iter().any(|&v| v == 1.0);
                has_zero && has_one && self.values.iter().all(|&v| v == 0.0 || v == 1.0)
            }
        }
    }
}

/// Rows are examples, columns are named numeric features
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureMatrix {
    columns: Vec<Column>,
    n_rows: usize,
}

impl EncodedFeatureMatrix {
    pub fn new(n_rows: usize, columns: Vec<Column>) -> Result<Self> {
        if let Some(column) = columns.iter().find(|c| c.values.len() != n_rows) {
            bail!(
                "Column {} has {} values, expected {}",
                column.name,
                column.values.len(),
                n_rows
            );
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name.to_string() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.to_string()).collect()
    }

    /// Keep only columns with at least `min_non_zero` non-zero entries
    pub fn retain_min_non_zero(mut self, min_non_zero: usize) -> Self {
        let before = self.columns.len();
        self.columns.retain(|column| column.non_zero_count() >= min_non_zero);
        log::debug!(
            "Dropped {} of {} columns with fewer than {} non-zero values",
            before - self.columns.len(),
            before,
            min_non_zero
        );
        self
    }

    /// Row-major copy for the estimators
    pub fn design_matrix(&self) -> Result<DesignMatrix> {
        let n_cols = self.columns.len();
        let mut data = vec![0.0; self.n_rows * n_cols];
        for (col, column) in self.columns.iter().enumerate() {
            for (row, &value) in column.values.iter().enumerate() {
                data[row * n_cols + col] = value;
            }
        }
        DesignMatrix::new(self.n_rows, n_cols, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::column::ColumnFamily;

    fn indicator(category: &str, values: Vec<f64>) -> Column {
        Column::new(
            ColumnName::categorical(ColumnFamily::LiwcOriginal, category),
            ColumnKind::Indicator,
            values,
        )
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let matrix = EncodedFeatureMatrix::new(
            4,
            vec![
                indicator("posemo", vec![1.0, 1.0, 0.0, 0.0]),
                indicator("negemo", vec![1.0, 0.0, 0.0, 0.0]),
            ],
        )
        .unwrap()
        .retain_min_non_zero(2);

        assert_eq!(matrix.names(), vec!["LIWC-original_posemo"]);
    }

    #[test]
    fn test_design_matrix_is_row_major() {
        let matrix = EncodedFeatureMatrix::new(
            2,
            vec![indicator("a", vec![1.0, 0.0]), indicator("b", vec![0.0, 1.0])],
        )
        .unwrap();
        let design = matrix.design_matrix().unwrap();
        assert_eq!(design.row(0), &[1.0, 0.0]);
        assert_eq!(design.row(1), &[0.0, 1.0]);
    }

    #[test]
    fn test_binary_detection() {
        let delta = |values| {
            Column::new(
                ColumnName::categorical(ColumnFamily::LiwcChange, "posemo"),
                ColumnKind::Delta,
                values,
            )
        };
        assert!(delta(vec![0.0, 1.0, 1.0]).is_binary());
        assert!(!delta(vec![0.0, 1.0, -1.0]).is_binary());
        assert!(!delta(vec![0.0, 0.0]).is_binary());
        assert!(indicator("posemo", vec![0.0, 1.0]).is_binary());
        assert!(!indicator("posemo", vec![0.0, 0.0]).is_binary());
        assert!(!indicator("posemo", vec![1.0, 1.0]).is_binary());
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        assert!(EncodedFeatureMatrix::new(3, vec![indicator("a", vec![1.0])]).is_err());
    }
}
