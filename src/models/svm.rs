//! Linear support vector classifier.
//!
//! L2-regularized squared-hinge loss, solved in the dual by coordinate
//! descent with shrinking. The bias is fitted as an extra constant feature
//! and is regularized like any other weight. Class weights are balanced:
//! each sample of class c gets `C * n / (2 * n_c)`.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::models::linalg::{dot, DesignMatrix};
use crate::models::{check_lengths, ModelError};

/// Seed for the per-epoch coordinate order
const COORDINATE_SEED: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub balanced: bool,
}

impl Default for LinearSvc {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-4,
            max_iter: 1_000_000,
            balanced: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvcFit {
    /// One weight per feature column; positive weights favour `true`
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl SvcFit {
    pub fn decision_function(&self, x: &DesignMatrix) -> Vec<f64> {
        (0..x.n_rows())
            .map(|row| dot(x.row(row), &self.coefficients) + self.intercept)
            .collect()
    }

    pub fn predict(&self, x: &DesignMatrix) -> Vec<bool> {
        self.decision_function(x).into_iter().map(|d| d > 0.0).collect()
    }
}

impl LinearSvc {
    fn class_costs(&self, labels: &[bool]) -> Result<(f64, f64), ModelError> {
        let n = labels.len() as f64;
        let n_true = labels.iter().filter(|&&label| label).count();
        let n_false = labels.len() - n_true;
        if n_true == 0 || n_false == 0 {
            return Err(ModelError::SingleClass);
        }
        if !self.balanced {
            return Ok((self.c, self.c));
        }
        Ok((
            self.c * n / (2.0 * n_false as f64),
            self.c * n / (2.0 * n_true as f64),
        ))
    }

    pub fn fit(&self, x: &DesignMatrix, labels: &[bool]) -> Result<SvcFit> {
        check_lengths(x, labels.len())?;
        let (cost_false, cost_true) = self.class_costs(labels)?;

        let n = x.n_rows();
        let d = x.n_cols();
        let signs: Vec<f64> = labels.iter().map(|&label| if label { 1.0 } else { -1.0 }).collect();
        // Squared hinge: infinite upper bound, diagonal shift 1 / (2 C_i)
        let diag: Vec<f64> = labels
            .iter()
            .map(|&label| 0.5 / if label { cost_true } else { cost_false })
            .collect();
        let qd: Vec<f64> = (0..n)
            .map(|i| {
                let row = x.row(i);
                diag[i] + dot(row, row) + 1.0
            })
            .collect();

        let mut alpha = vec![0.0; n];
        let mut w = vec![0.0; d];
        let mut bias = 0.0;
        let mut index: Vec<usize> = (0..n).collect();
        let mut active_size = n;
        let mut pg_max_old = f64::INFINITY;
        let mut rng = StdRng::seed_from_u64(COORDINATE_SEED);

        let mut iteration = 0;
        let mut converged = false;
        while iteration < self.max_iter {
            let mut pg_max_new = f64::NEG_INFINITY;
            let mut pg_min_new = f64::INFINITY;

            index[..active_size].shuffle(&mut rng);

            let mut s = 0;
            while s < active_size {
                let i = index[s];
                let row = x.row(i);
                let y = signs[i];
                let g = y * (dot(&w, row) + bias) - 1.0 + diag[i] * alpha[i];

                let mut pg = 0.0;
                if alpha[i] == 0.0 {
                    if g > pg_max_old {
                        active_size -= 1;
                        index.swap(s, active_size);
                        continue;
                    } else if g < 0.0 {
                        pg = g;
                    }
                } else {
                    pg = g;
                }

                pg_max_new = pg_max_new.max(pg);
                pg_min_new = pg_min_new.min(pg);

                if pg.abs() > 1e-12 {
                    let alpha_old = alpha[i];
                    alpha[i] = (alpha[i] - g / qd[i]).max(0.0);
                    let step = (alpha[i] - alpha_old) * y;
                    for (weight, value) in w.iter_mut().zip(row) {
                        *weight += step * value;
                    }
                    bias += step;
                }
                s += 1;
            }

            iteration += 1;

            if pg_max_new - pg_min_new <= self.tol {
                if active_size == n {
                    converged = true;
                    break;
                }
                active_size = n;
                pg_max_old = f64::INFINITY;
                continue;
            }

            pg_max_old = if pg_max_new <= 0.0 { f64::INFINITY } else { pg_max_new };
        }
        if !converged {
            // callers aggregate these into one warning
            log::debug!("LinearSvc stopped at the {} iteration limit", self.max_iter);
        }

        Ok(SvcFit {
            coefficients: w,
            intercept: bias,
            iterations: iteration,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (DesignMatrix, Vec<bool>) {
        let rows = vec![
            vec![2.0, 0.1],
            vec![1.5, -0.2],
            vec![1.8, 0.3],
            vec![-2.0, 0.2],
            vec![-1.7, -0.1],
            vec![-1.6, 0.0],
        ];
        let labels = vec![true, true, true, false, false, false];
        (DesignMatrix::from_rows(&rows).unwrap(), labels)
    }

    #[test]
    fn test_separable_data_is_classified() {
        let (x, labels) = separable();
        let fit = LinearSvc::default().fit(&x, &labels).unwrap();
        assert!(fit.converged);
        assert!(fit.coefficients[0] > 0.0);
        assert!(fit.coefficients[0].abs() > fit.coefficients[1].abs());
        assert_eq!(fit.predict(&x), labels);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, labels) = separable();
        let svc = LinearSvc::default();
        let first = svc.fit(&x, &labels).unwrap();
        let second = svc.fit(&x, &labels).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let (x, _) = separable();
        let err = LinearSvc::default().fit(&x, &[true; 6]).unwrap_err();
        assert!(matches!(err.downcast_ref::<ModelError>(), Some(ModelError::SingleClass)));
    }

    #[test]
    fn test_balanced_costs() {
        let svc = LinearSvc::default();
        let (cost_false, cost_true) = svc.class_costs(&[true, false, false, false]).unwrap();
        assert!((cost_true - 2.0).abs() < 1e-12);
        assert!((cost_false - 4.0 / 6.0).abs() < 1e-12);
    }
}
