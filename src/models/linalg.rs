//! Dense row-major matrices and normal-equation solves.

use anyhow::{bail, Result};
use thiserror::Error;

/// Pivots at or below this are treated as zero
const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum LinalgError {
    #[error("Matrix is not positive definite (pivot {pivot} at column {column})")]
    NotPositiveDefinite { column: usize, pivot: f64 },
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Row-major `n_rows x n_cols` matrix of f64
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl DesignMatrix {
    pub fn new(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n_rows * n_cols {
            bail!(LinalgError::DimensionMismatch {
                expected: n_rows * n_cols,
                actual: data.len(),
            });
        }
        Ok(Self { data, n_rows, n_cols })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            if row.len() != n_cols {
                bail!(LinalgError::DimensionMismatch {
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), n_cols, data)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n_cols..(row + 1) * self.n_cols]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows).map(|row| self.get(row, col)).collect()
    }

    /// Copy with a leading column of ones
    pub fn with_intercept(&self) -> Self {
        let n_cols = self.n_cols + 1;
        let mut data = Vec::with_capacity(self.n_rows * n_cols);
        for row in 0..self.n_rows {
            data.push(1.0);
            data.extend_from_slice(self.row(row));
        }
        Self {
            data,
            n_rows: self.n_rows,
            n_cols,
        }
    }

    /// Per-column means
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.n_cols];
        if self.n_rows == 0 {
            return means;
        }
        for row in 0..self.n_rows {
            for (mean, value) in means.iter_mut().zip(self.row(row)) {
                *mean += value;
            }
        }
        let n = self.n_rows as f64;
        means.iter_mut().for_each(|mean| *mean /= n);
        means
    }

    /// Copy with `offsets` subtracted from every row
    pub fn centered(&self, offsets: &[f64]) -> Self {
        let mut data = self.data.clone();
        for chunk in data.chunks_mut(self.n_cols.max(1)) {
            for (value, offset) in chunk.iter_mut().zip(offsets) {
                *value -= offset;
            }
        }
        Self {
            data,
            n_rows: self.n_rows,
            n_cols: self.n_cols,
        }
    }

    /// X^T X, row-major `n_cols x n_cols`
    pub fn gram(&self) -> Vec<f64> {
        let k = self.n_cols;
        let mut gram = vec![0.0; k * k];
        for row in 0..self.n_rows {
            let x = self.row(row);
            for i in 0..k {
                if x[i] == 0.0 {
                    continue;
                }
                for j in i..k {
                    gram[i * k + j] += x[i] * x[j];
                }
            }
        }
        for i in 0..k {
            for j in 0..i {
                gram[i * k + j] = gram[j * k + i];
            }
        }
        gram
    }

    /// X^T y
    pub fn transpose_mul(&self, y: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_cols];
        for (row, &target) in y.iter().enumerate().take(self.n_rows) {
            for (acc, value) in out.iter_mut().zip(self.row(row)) {
                *acc += value * target;
            }
        }
        out
    }

    /// X w
    pub fn mul_vec(&self, weights: &[f64]) -> Vec<f64> {
        (0..self.n_rows).map(|row| dot(self.row(row), weights)).collect()
    }

    /// Copy whose i-th row is row `order[i]` of this matrix
    pub fn select_rows(&self, order: &[usize]) -> Self {
        let mut data = Vec::with_capacity(order.len() * self.n_cols);
        for &row in order {
            data.extend_from_slice(self.row(row));
        }
        Self {
            data,
            n_rows: order.len(),
            n_cols: self.n_cols,
        }
    }
}

#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix
pub fn cholesky(matrix: &[f64], k: usize) -> Result<Vec<f64>, LinalgError> {
    if matrix.len() != k * k {
        return Err(LinalgError::DimensionMismatch {
            expected: k * k,
            actual: matrix.len(),
        });
    }
    let mut l = vec![0.0; k * k];
    for i in 0..k {
        for j in 0..=i {
            let mut sum = matrix[i * k + j];
            for p in 0..j {
                sum -= l[i * k + p] * l[j * k + p];
            }
            if i == j {
                if sum <= PIVOT_EPSILON {
                    return Err(LinalgError::NotPositiveDefinite { column: i, pivot: sum });
                }
                l[i * k + j] = sum.sqrt();
            } else {
                l[i * k + j] = sum / l[j * k + j];
            }
        }
    }
    Ok(l)
}

/// Solve L L^T x = rhs given the factor L
pub fn cholesky_solve_factored(l: &[f64], rhs: &[f64], k: usize) -> Vec<f64> {
    let mut y = vec![0.0; k];
    for i in 0..k {
        let mut sum = rhs[i];
        for j in 0..i {
            sum -= l[i * k + j] * y[j];
        }
        y[i] = sum / l[i * k + i];
    }

    let mut x = vec![0.0; k];
    for i in (0..k).rev() {
        let mut sum = y[i];
        for j in (i + 1)..k {
            sum -= l[j * k + i] * x[j];
        }
        x[i] = sum / l[i * k + i];
    }
    x
}

/// Solve `matrix * x = rhs` for symmetric positive definite `matrix`
pub fn cholesky_solve(matrix: &[f64], rhs: &[f64], k: usize) -> Result<Vec<f64>, LinalgError> {
    if rhs.len() != k {
        return Err(LinalgError::DimensionMismatch {
            expected: k,
            actual: rhs.len(),
        });
    }
    let l = cholesky(matrix, k)?;
    Ok(cholesky_solve_factored(&l, rhs, k))
}

/// Inverse of a symmetric positive definite matrix, row-major
pub fn spd_inverse(matrix: &[f64], k: usize) -> Result<Vec<f64>, LinalgError> {
    let l = cholesky(matrix, k)?;
    let mut inverse = vec![0.0; k * k];
    let mut unit = vec![0.0; k];
    for col in 0..k {
        unit.iter_mut().for_each(|v| *v = 0.0);
        unit[col] = 1.0;
        let x = cholesky_solve_factored(&l, &unit, k);
        for row in 0..k {
            inverse[row * k + col] = x[row];
        }
    }
    Ok(inverse)
}

/// Add `value` to every diagonal entry except the first `skip`
pub fn add_to_diagonal(matrix: &mut [f64], k: usize, value: f64, skip: usize) {
    for i in skip..k {
        matrix[i * k + i] += value;
    }
}
