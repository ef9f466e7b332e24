//! Statistical procedures over the encoded feature matrix
//!
//! - `permutation`: LinearSvc coefficient significance by permutation
//! - `dominance`: positive/negative coverage ratio of binary columns
//! - `regression`: single-fit OLS and Ridge reports
//! - `report`: CSV, SVG and console output

pub mod dominance;
pub mod permutation;
pub mod regression;
pub mod report;

use thiserror::Error;

pub use dominance::{dominance_scores, DominanceScore};
pub use permutation::{PermutationTest, SignificanceResult};
pub use regression::{example_words, run_ols, run_ridge, CoefficientRow, FeatureExamples, OlsReport, RidgeReport};

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Dominance score needs a binary label vector")]
    NonBinaryLabels,
    #[error("Labels contain only {0} examples; both classes are required")]
    SingleClass(&'static str),
    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Unknown analysis mode '{0}': must be one of {{dominance-score, ols, ridge, svm}}")]
    UnknownMode(String),
}

/// Dependent variable handed to an analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// the model's boolean prediction
    Binary(Vec<bool>),
    /// the model's score gap
    Continuous(Vec<f64>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Binary(labels) => labels.len(),
            Labels::Continuous(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boolean labels, with both classes present
    pub fn as_binary(&self) -> Result<&[bool], AnalysisError> {
        let labels = match self {
            Labels::Binary(labels) => labels.as_slice(),
            Labels::Continuous(_) => return Err(AnalysisError::NonBinaryLabels),
        };
        if !labels.iter().any(|&label| label) {
            return Err(AnalysisError::SingleClass("negative"));
        }
        if labels.iter().all(|&label| label) {
            return Err(AnalysisError::SingleClass("positive"));
        }
        Ok(labels)
    }

    /// Numeric view; booleans map to 0/1
    pub fn as_values(&self) -> Vec<f64> {
        match self {
            Labels::Binary(labels) => labels.iter().map(|&label| f64::from(u8::from(label))).collect(),
            Labels::Continuous(values) => values.clone(),
        }
    }

    pub(crate) fn check_rows(&self, rows: usize) -> Result<(), AnalysisError> {
        if self.len() != rows {
            return Err(AnalysisError::LengthMismatch { rows, labels: self.len() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_view() {
        let labels = Labels::Binary(vec![true, false, true]);
        assert_eq!(labels.as_binary().unwrap(), &[true, false, true]);
        assert_eq!(labels.as_values(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_continuous_labels_are_not_binary() {
        let labels = Labels::Continuous(vec![0.1, -0.4]);
        assert_eq!(labels.as_binary().unwrap_err(), AnalysisError::NonBinaryLabels);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let labels = Labels::Binary(vec![true, true]);
        assert_eq!(labels.as_binary().unwrap_err(), AnalysisError::SingleClass("positive"));
        assert!(labels.check_rows(3).is_err());
    }
}
