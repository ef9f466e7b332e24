//! Ridge regression with an unpenalized intercept.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::linalg::{add_to_diagonal, cholesky_solve, dot, DesignMatrix};
use crate::models::{check_lengths, r_squared};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub alpha: f64,
}

impl Default for Ridge {
    fn default() -> Self {
        Self { alpha: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidgeFit {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RidgeFit {
    pub fn predict(&self, x: &DesignMatrix) -> Vec<f64> {
        (0..x.n_rows())
            .map(|row| dot(x.row(row), &self.coefficients) + self.intercept)
            .collect()
    }
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Fits on centered data so the intercept escapes the penalty
    pub fn fit(&self, x: &DesignMatrix, y: &[f64]) -> Result<RidgeFit> {
        check_lengths(x, y.len())?;
        let k = x.n_cols();
        let x_means = x.column_means();
        let y_mean = if y.is_empty() {
            0.0
        } else {
            y.iter().sum::<f64>() / y.len() as f64
        };

        let centered = x.centered(&x_means);
        let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        let mut gram = centered.gram();
        add_to_diagonal(&mut gram, k, self.alpha, 0);
        let coefficients = cholesky_solve(&gram, &centered.transpose_mul(&y_centered), k)?;
        let intercept = y_mean - dot(&x_means, &coefficients);

        let mut fit = RidgeFit {
            coefficients,
            intercept,
            r_squared: f64::NAN,
        };
        fit.r_squared = r_squared(y, &fit.predict(x));
        Ok(fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (DesignMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, ((i * 3) % 4) as f64]).collect();
        let y = rows.iter().map(|r| 4.0 + 1.5 * r[0] - 0.5 * r[1]).collect();
        (DesignMatrix::from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn test_tiny_alpha_recovers_least_squares() {
        let (x, y) = data();
        let fit = Ridge::new(1e-9).fit(&x, &y).unwrap();
        assert!((fit.coefficients[0] - 1.5).abs() < 1e-6);
        assert!((fit.coefficients[1] + 0.5).abs() < 1e-6);
        assert!((fit.intercept - 4.0).abs() < 1e-6);
        assert!(fit.r_squared > 0.999_999);
    }

    #[test]
    fn test_penalty_shrinks_coefficients() {
        let (x, y) = data();
        let loose = Ridge::new(0.1).fit(&x, &y).unwrap();
        let tight = Ridge::new(100.0).fit(&x, &y).unwrap();
        assert!(tight.coefficients[0].abs() < loose.coefficients[0].abs());
        assert!(tight.r_squared < loose.r_squared);
    }
}
