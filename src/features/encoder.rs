//! Turns a `FeatureTable` into an `EncodedFeatureMatrix`.
//!
//! Steps run in a fixed order:
//! 1. concreteness-change = original - replacement (NaN propagates)
//! 2. one indicator column per category label of each categorical feature
//! 3. mean imputation, then standardization, of the scalar columns
//! 4. optionally, original/replacement indicator pairs sharing a label are
//!    merged into one signed delta column
//! 5. columns with too few non-zero values are dropped

use std::collections::BTreeSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::features::column::{ColumnFamily, ColumnName};
use crate::features::matrix::{Column, ColumnKind, EncodedFeatureMatrix};
use crate::features::record::{FeatureRecord, FeatureTable, RawFeature};

/// Default minimum number of non-zero values a column needs to survive
pub const DEFAULT_MIN_NON_ZERO: usize = 50;

const CATEGORICAL_FEATURES: [RawFeature; 4] = [
    RawFeature::LevinOriginal,
    RawFeature::LevinReplacement,
    RawFeature::LiwcOriginal,
    RawFeature::LiwcReplacement,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    pub merge: bool,
    pub min_non_zero: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            merge: true,
            min_non_zero: DEFAULT_MIN_NON_ZERO,
        }
    }
}

/// Original minus replacement concreteness; NaN if either is missing
pub fn concreteness_change(record: &FeatureRecord) -> f64 {
    record.concreteness_original - record.concreteness_replacement
}

/// Multi-label binarizer with sorted classes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBinarizer {
    classes: Vec<String>,
}

impl CategoryBinarizer {
    pub fn fit<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let classes: BTreeSet<&String> = rows.into_iter().flatten().collect();
        Self {
            classes: classes.into_iter().cloned().collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// One 0/1 vector per class; labels outside the fitted classes are ignored
    pub fn transform<'a, I>(&self, rows: I) -> Vec<Vec<f64>>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let rows: Vec<&[String]> = rows.into_iter().collect();
        let mut columns = vec![vec![0.0; rows.len()]; self.classes.len()];
        for (row, labels) in rows.iter().enumerate() {
            for label in labels.iter() {
                if let Ok(index) = self.classes.binary_search(label) {
                    columns[index][row] = 1.0;
                }
            }
        }
        columns
    }
}

/// Mean imputation followed by standardization, fitted on one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarScaler {
    fill: f64,
    mean: f64,
    scale: f64,
}

impl ScalarScaler {
    pub fn fit(values: &[f64]) -> Self {
        let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let fill = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };

        let imputed: Vec<f64> = values.iter().map(|&v| if v.is_nan() { fill } else { v }).collect();
        let n = imputed.len().max(1) as f64;
        let mean = imputed.iter().sum::<f64>() / n;
        let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 { std } else { 1.0 };

        Self { fill, mean, scale }
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .map(|&v| {
                let v = if v.is_nan() { self.fill } else { v };
                (v - self.mean) / self.scale
            })
            .collect()
    }
}

/// Encoder whose category vocabularies and scalers are fixed
#[derive(Debug, Clone)]
pub struct FittedEncoder {
    options: EncoderOptions,
    binarizers: Vec<(RawFeature, CategoryBinarizer)>,
    scalers: Vec<(ColumnFamily, ScalarScaler)>,
}

impl FittedEncoder {
    pub fn options(&self) -> EncoderOptions {
        self.options
    }

    pub fn classes(&self, feature: RawFeature) -> &[String] {
        self.binarizers
            .iter()
            .find(|(f, _)| *f == feature)
            .map(|(_, binarizer)| binarizer.classes())
            .unwrap_or(&[])
    }

    pub fn transform(&self, table: &FeatureTable) -> Result<EncodedFeatureMatrix> {
        let records = &table.records;
        let mut columns = Vec::new();

        for (feature, binarizer) in &self.binarizers {
            let family = match ColumnFamily::for_raw(*feature) {
                Some(family) => family,
                None => continue,
            };
            let values = binarizer.transform(records.iter().map(|r| r.categories(*feature)));
            for (class, values) in binarizer.classes().iter().zip(values) {
                columns.push(Column::new(
                    ColumnName::categorical(family, class.as_str()),
                    ColumnKind::Indicator,
                    values,
                ));
            }
        }

        for (family, scaler) in &self.scalers {
            let raw = scalar_values(records, *family);
            columns.push(Column::new(
                ColumnName::scalar(*family),
                ColumnKind::Scalar,
                scaler.transform(&raw),
            ));
        }

        if self.options.merge {
            columns = merge_original_replacement(columns);
        }

        let matrix = EncodedFeatureMatrix::new(records.len(), columns)?;
        Ok(matrix.retain_min_non_zero(self.options.min_non_zero))
    }
}

fn scalar_values(records: &[FeatureRecord], family: ColumnFamily) -> Vec<f64> {
    records
        .iter()
        .map(|record| match family {
            ColumnFamily::ConcretenessChange => concreteness_change(record),
            ColumnFamily::TextSimilarity => record.text_similarity,
            ColumnFamily::WordSimilarity => record.word_similarity,
            _ => f64::NAN,
        })
        .collect()
}

/// Replace each original/replacement indicator pair sharing a category
/// label with one `original - replacement` column
///
/// Unpaired columns keep their position; merged columns are appended.
pub fn merge_original_replacement(columns: Vec<Column>) -> Vec<Column> {
    let mut consumed = vec![false; columns.len()];
    let mut merged = Vec::new();

    for (i, original) in columns.iter().enumerate() {
        let (replacement_family, merged_family) = match original.name.family.counterpart() {
            Some(pair) => pair,
            None => continue,
        };
        let partner = columns.iter().position(|column| {
            column.name.family == replacement_family && column.name.category == original.name.category
        });
        if let Some(j) = partner {
            let values = original
                .values
                .iter()
                .zip(&columns[j].values)
                .map(|(o, r)| o - r)
                .collect();
            let name = ColumnName {
                family: merged_family,
                category: original.name.category.clone(),
            };
            merged.push(Column::new(name, ColumnKind::Delta, values));
            consumed[i] = true;
            consumed[j] = true;
        }
    }

    log::debug!("Merged {} original/replacement column pairs", merged.len());
    columns
        .into_iter()
        .zip(consumed)
        .filter_map(|(column, used)| (!used).then_some(column))
        .chain(merged)
        .collect()
}

/// Fits vocabularies and scalers on a table
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder {
    options: EncoderOptions,
}

impl FeatureEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn fit(&self, table: &FeatureTable) -> FittedEncoder {
        let records = &table.records;
        let binarizers = CATEGORICAL_FEATURES
            .iter()
            .map(|&feature| {
                let binarizer = CategoryBinarizer::fit(records.iter().map(|r| r.categories(feature)));
                (feature, binarizer)
            })
            .collect();
        let scalers = [
            ColumnFamily::ConcretenessChange,
            ColumnFamily::TextSimilarity,
            ColumnFamily::WordSimilarity,
        ]
        .into_iter()
        .map(|family| (family, ScalarScaler::fit(&scalar_values(records, family))))
        .collect();

        FittedEncoder {
            options: self.options,
            binarizers,
            scalers,
        }
    }

    pub fn encode(&self, table: &FeatureTable) -> Result<EncodedFeatureMatrix> {
        let matrix = self.fit(table).transform(table)?;
        log::info!(
            "Encoded {} examples into {} feature columns (merge: {})",
            matrix.n_rows(),
            matrix.n_cols(),
            self.options.merge
        );
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NegationType;

    fn record(id: i64, liwc_original: &[&str], liwc_replacement: &[&str], concreteness: (f64, f64)) -> FeatureRecord {
        let labels = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        FeatureRecord {
            id,
            word_original: format!("w{}", id),
            word_replacement: format!("r{}", id),
            negation_type: NegationType::Object,
            levin_original: vec![],
            levin_replacement: vec![],
            liwc_original: labels(liwc_original),
            liwc_replacement: labels(liwc_replacement),
            concreteness_original: concreteness.0,
            concreteness_replacement: concreteness.1,
            text_similarity: 0.5 + id as f64 / 10.0,
            word_similarity: f64::NAN,
            label: id % 2 == 0,
            score_gap: 0.0,
        }
    }

    fn table(records: Vec<FeatureRecord>) -> FeatureTable {
        FeatureTable {
            records,
            ..Default::default()
        }
    }

    #[test]
    fn test_concreteness_change_is_exact() {
        let r = record(0, &[], &[], (4.86, 1.25));
        assert_eq!(concreteness_change(&r), 4.86 - 1.25);
        let missing = record(1, &[], &[], (4.86, f64::NAN));
        assert!(concreteness_change(&missing).is_nan());
    }

    #[test]
    fn test_binarizer_sorts_classes_and_ignores_unseen() {
        let fit_rows = [vec!["b".to_string()], vec!["a".to_string(), "b".to_string()]];
        let binarizer = CategoryBinarizer::fit(fit_rows.iter().map(|r| r.as_slice()));
        assert_eq!(binarizer.classes(), &["a".to_string(), "b".to_string()]);

        let rows = [vec!["c".to_string()], vec!["a".to_string()]];
        let columns = binarizer.transform(rows.iter().map(|r| r.as_slice()));
        assert_eq!(columns, vec![vec![0.0, 1.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_scaler_imputes_before_standardizing() {
        let scaler = ScalarScaler::fit(&[1.0, f64::NAN, 3.0]);
        let scaled = scaler.transform(&[1.0, f64::NAN, 3.0]);
        // fill = 2, imputed column [1, 2, 3], population std sqrt(2/3)
        let std = (2.0f64 / 3.0).sqrt();
        assert!((scaled[0] + 1.0 / std).abs() < 1e-12);
        assert_eq!(scaled[1], 0.0);
        assert!((scaled[2] - 1.0 / std).abs() < 1e-12);

        let constant = ScalarScaler::fit(&[f64::NAN, f64::NAN]);
        assert_eq!(constant.transform(&[f64::NAN]), vec![0.0]);
    }

    #[test]
    fn test_merge_produces_signed_deltas() {
        let records = vec![
            record(0, &["posemo"], &["posemo"], (1.0, 2.0)),
            record(1, &["posemo"], &[], (1.0, 2.0)),
            record(2, &[], &["posemo", "social"], (1.0, 2.0)),
            record(3, &["affect"], &[], (1.0, 2.0)),
        ];
        let encoder = FeatureEncoder::new(EncoderOptions {
            merge: true,
            min_non_zero: 0,
        });
        let matrix = encoder.encode(&table(records)).unwrap();

        let merged = matrix.column("LIWC_change_posemo").unwrap();
        assert_eq!(merged.kind, ColumnKind::Delta);
        assert_eq!(merged.values, vec![0.0, 1.0, -1.0, 0.0]);
        assert!(matrix.column("LIWC-original_posemo").is_none());
        assert!(matrix.column("LIWC-replacement_posemo").is_none());

        // no counterpart, left as indicators
        assert_eq!(matrix.column("LIWC-original_affect").unwrap().values, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(matrix.column("LIWC-replacement_social").unwrap().kind, ColumnKind::Indicator);

        let names = matrix.names();
        assert_eq!(names.last().map(String::as_str), Some("LIWC_change_posemo"));
    }

    #[test]
    fn test_unmerged_keeps_both_sides() {
        let records = vec![
            record(0, &["posemo"], &["posemo"], (1.0, 2.0)),
            record(1, &["posemo"], &[], (3.0, 2.0)),
        ];
        let encoder = FeatureEncoder::new(EncoderOptions {
            merge: false,
            min_non_zero: 0,
        });
        let matrix = encoder.encode(&table(records)).unwrap();
        assert_eq!(
            matrix.names(),
            vec![
                "LIWC-original_posemo",
                "LIWC-replacement_posemo",
                "concreteness-change",
                "text_similarity",
                "word_similarity",
            ]
        );
    }

    #[test]
    fn test_min_non_zero_drops_sparse_columns() {
        let records = vec![
            record(0, &["posemo"], &[], (1.0, 2.0)),
            record(1, &["posemo"], &[], (1.0, 2.0)),
            record(2, &["negemo"], &[], (1.0, 2.0)),
        ];
        let encoder = FeatureEncoder::new(EncoderOptions {
            merge: true,
            min_non_zero: 2,
        });
        let matrix = encoder.encode(&table(records)).unwrap();
        assert!(matrix.column("LIWC-original_posemo").is_some());
        assert!(matrix.column("LIWC-original_negemo").is_none());
        // constant concreteness change standardizes to all zeros
        assert!(matrix.column("concreteness-change").is_none());
        assert!(matrix.column("text_similarity").is_some());
    }
}
