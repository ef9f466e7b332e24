//! Single-fit regressions on the encoded matrix.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use crate::analysis::Labels;
use crate::features::{ColumnName, EncodedFeatureMatrix, FeatureTable};
use crate::models::{Ols, Ridge};

/// Name of the constant term in coefficient tables
pub const CONSTANT_NAME: &str = "const";

/// Words listed per significant category column
pub const EXAMPLE_WORD_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRow {
    pub feature: String,
    pub coefficient: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureExamples {
    pub feature: String,
    /// (word, frequency), most frequent first
    pub words: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OlsReport {
    pub r_squared: f64,
    /// constant first, then one row per column
    pub coefficients: Vec<CoefficientRow>,
    /// rows with p <= the significance level, by coefficient descending
    pub significant: Vec<CoefficientRow>,
    pub examples: Vec<FeatureExamples>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidgeCoefficient {
    pub feature: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidgeReport {
    pub r_squared: f64,
    /// by coefficient descending
    pub coefficients: Vec<RidgeCoefficient>,
}

pub fn run_ols(
    matrix: &EncodedFeatureMatrix,
    labels: &Labels,
    table: &FeatureTable,
    significance_level: f64,
) -> Result<OlsReport> {
    labels.check_rows(matrix.n_rows())?;
    let fit = Ols.fit(&matrix.design_matrix()?, &labels.as_values())?;

    let names = std::iter::once(CONSTANT_NAME.to_string()).chain(matrix.names());
    let coefficients: Vec<CoefficientRow> = names
        .enumerate()
        .map(|(i, feature)| CoefficientRow {
            feature,
            coefficient: fit.params[i],
            std_error: fit.std_errors[i],
            t_value: fit.t_values[i],
            p_value: fit.p_values[i],
        })
        .collect();

    let mut significant: Vec<CoefficientRow> = coefficients
        .iter()
        .filter(|row| row.p_value <= significance_level)
        .cloned()
        .collect();
    significant.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));

    let examples = significant
        .iter()
        .filter_map(|row| ColumnName::parse(&row.feature))
        .filter(|name| name.family.raw_sides().is_some())
        .map(|name| FeatureExamples {
            feature: name.to_string(),
            words: example_words(table, &name, EXAMPLE_WORD_LIMIT),
        })
        .collect();

    Ok(OlsReport {
        r_squared: fit.r_squared,
        coefficients,
        significant,
        examples,
    })
}

/// Most frequent words carrying the column's category on either side of
/// the swap
pub fn example_words(table: &FeatureTable, column: &ColumnName, limit: usize) -> Vec<(String, usize)> {
    let (category, (original_side, replacement_side)) = match (&column.category, column.family.raw_sides()) {
        (Some(category), Some(sides)) => (category, sides),
        _ => return Vec::new(),
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in &table.records {
        if record.categories(original_side).contains(category) {
            *counts.entry(record.word_original.as_str()).or_insert(0) += 1;
        }
        if record.categories(replacement_side).contains(category) {
            *counts.entry(record.word_replacement.as_str()).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(word, count)| (word.to_string(), count))
        .collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(limit);
    words
}

pub fn run_ridge(matrix: &EncodedFeatureMatrix, labels: &Labels, alpha: f64) -> Result<RidgeReport> {
    labels.check_rows(matrix.n_rows())?;
    let fit = Ridge::new(alpha).fit(&matrix.design_matrix()?, &labels.as_values())?;

    let mut coefficients: Vec<RidgeCoefficient> = matrix
        .names()
        .into_iter()
        .zip(fit.coefficients)
        .map(|(feature, coefficient)| RidgeCoefficient { feature, coefficient })
        .collect();
    coefficients.sort_by(|a, b| b.coefficient.total_cmp(&a.coefficient));

    Ok(RidgeReport {
        r_squared: fit.r_squared,
        coefficients,
    })
}
