//! Ordinary least squares with a constant term.

use anyhow::{anyhow, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::models::linalg::{add_to_diagonal, cholesky_solve, spd_inverse, DesignMatrix, LinalgError};
use crate::models::{check_lengths, r_squared, ModelError};

/// Diagonal jitter, relative to the largest diagonal entry, used when the
/// normal equations are rank deficient
const RANK_JITTER: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OlsFit {
    /// `params[0]` is the constant, `params[i + 1]` belongs to column i
    pub params: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub r_squared: f64,
    pub df_resid: usize,
}

impl OlsFit {
    pub fn intercept(&self) -> f64 {
        self.params[0]
    }

    /// Coefficients without the constant
    pub fn coefficients(&self) -> &[f64] {
        &self.params[1..]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ols;

impl Ols {
    pub fn fit(&self, x: &DesignMatrix, y: &[f64]) -> Result<OlsFit> {
        check_lengths(x, y.len())?;
        let design = x.with_intercept();
        let n = design.n_rows();
        let k = design.n_cols();
        if n <= k {
            return Err(ModelError::TooFewRows { rows: n, params: k }.into());
        }

        let mut gram = design.gram();
        let rhs = design.transpose_mul(y);
        let (params, inverse) = match solve_with_inverse(&gram, &rhs, k) {
            Ok(solution) => solution,
            Err(LinalgError::NotPositiveDefinite { column, .. }) => {
                log::warn!("Design matrix is rank deficient near column {}; adding jitter", column);
                let max_diag = (0..k).map(|i| gram[i * k + i]).fold(0.0, f64::max);
                add_to_diagonal(&mut gram, k, RANK_JITTER * max_diag.max(1.0), 0);
                solve_with_inverse(&gram, &rhs, k)?
            }
            Err(e) => return Err(e.into()),
        };

        let fitted = design.mul_vec(&params);
        let ssr: f64 = y.iter().zip(&fitted).map(|(a, b)| (a - b).powi(2)).sum();
        let df_resid = n - k;
        let sigma2 = ssr / df_resid as f64;

        let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64).map_err(|e| anyhow!("Student t: {}", e))?;
        let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * inverse[i * k + i]).max(0.0).sqrt()).collect();
        let t_values: Vec<f64> = params.iter().zip(&std_errors).map(|(b, se)| b / se).collect();
        let p_values = t_values
            .iter()
            .map(|t| {
                if t.is_nan() {
                    f64::NAN
                } else {
                    2.0 * (1.0 - t_dist.cdf(t.abs()))
                }
            })
            .collect();

        Ok(OlsFit {
            params,
            std_errors,
            t_values,
            p_values,
            r_squared: r_squared(y, &fitted),
            df_resid,
        })
    }
}

fn solve_with_inverse(gram: &[f64], rhs: &[f64], k: usize) -> Result<(Vec<f64>, Vec<f64>), LinalgError> {
    let params = cholesky_solve(gram, rhs, k)?;
    let inverse = spd_inverse(gram, k)?;
    Ok((params, inverse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_linear_relation() {
        // y = 1 + 2 x0 - 3 x1
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let y: Vec<f64> = rows.iter().map(|r| 1.0 + 2.0 * r[0] - 3.0 * r[1]).collect();
        let fit = Ols.fit(&DesignMatrix::from_rows(&rows).unwrap(), &y).unwrap();

        assert!((fit.intercept() - 1.0).abs() < 1e-8);
        assert!((fit.coefficients()[0] - 2.0).abs() < 1e-8);
        assert!((fit.coefficients()[1] + 3.0).abs() < 1e-8);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
        assert_eq!(fit.df_resid, 5);
    }

    #[test]
    fn test_noise_feature_is_not_significant() {
        let signal = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let noise = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0];
        // orthogonal to the constant, the signal and the noise column
        let wobble = [0.1, -0.1, -0.1, 0.1, 0.1, -0.1, -0.1, 0.1, 0.0, 0.0];
        let rows: Vec<Vec<f64>> = signal.iter().zip(&noise).map(|(s, n)| vec![*s, *n]).collect();
        let y: Vec<f64> = signal.iter().zip(&wobble).map(|(s, w)| 0.5 * s + w).collect();

        let fit = Ols.fit(&DesignMatrix::from_rows(&rows).unwrap(), &y).unwrap();
        assert!(fit.p_values[1] < 0.001);
        assert!(fit.coefficients()[1].abs() < 1e-8);
        assert!(fit.p_values[2] > 0.05);
    }

    #[test]
    fn test_too_few_rows() {
        let x = DesignMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap();
        assert!(Ols.fit(&x, &[1.0, 2.0]).is_err());
    }
}
