//! Linear estimators fitted on the encoded feature matrix.

pub mod linalg;
pub mod ols;
pub mod ridge;
pub mod svm;

use thiserror::Error;

pub use linalg::{DesignMatrix, LinalgError};
pub use ols::{Ols, OlsFit};
pub use ridge::{Ridge, RidgeFit};
pub use svm::{LinearSvc, SvcFit};

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Feature matrix has {rows} rows but {targets} targets were given")]
    LengthMismatch { rows: usize, targets: usize },
    #[error("Labels contain a single class; a classifier needs both")]
    SingleClass,
    #[error("{rows} rows cannot determine {params} parameters")]
    TooFewRows { rows: usize, params: usize },
}

pub(crate) fn check_lengths(x: &DesignMatrix, targets: usize) -> Result<(), ModelError> {
    if x.n_rows() != targets {
        return Err(ModelError::LengthMismatch {
            rows: x.n_rows(),
            targets,
        });
    }
    Ok(())
}

/// Coefficient of determination against the mean of `y`
pub fn r_squared(y: &[f64], fitted: &[f64]) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let ss_res: f64 = y.iter().zip(fitted).map(|(a, b)| (a - b).powi(2)).sum();
    if ss_tot == 0.0 {
        return f64::NAN;
    }
    1.0 - ss_res / ss_tot
}
