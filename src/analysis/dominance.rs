//! Dominance score: how much more often a binary feature fires among
//! positive-labelled rows than among negative-labelled ones.

use serde::Serialize;

use crate::analysis::{AnalysisError, Labels};
use crate::features::EncodedFeatureMatrix;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceScore {
    pub feature: String,
    /// positive coverage / negative coverage; infinite when the feature
    /// never fires on a negative row
    pub score: f64,
    pub positive_coverage: f64,
    pub negative_coverage: f64,
}

/// Scores for every binary column, highest first
///
/// Columns that fire on no row of either class have no defined ratio and
/// are left out.
pub fn dominance_scores(matrix: &EncodedFeatureMatrix, labels: &Labels) -> Result<Vec<DominanceScore>, AnalysisError> {
    labels.check_rows(matrix.n_rows())?;
    let labels = labels.as_binary()?;
    let total_positive = labels.iter().filter(|&&label| label).count() as f64;
    let total_negative = labels.len() as f64 - total_positive;

    let mut scores = Vec::new();
    for column in matrix.columns().iter().filter(|column| column.is_binary()) {
        let (mut positive_hits, mut negative_hits) = (0usize, 0usize);
        for (&value, &label) in column.values.iter().zip(labels) {
            if value != 0.0 {
                if label {
                    positive_hits += 1;
                } else {
                    negative_hits += 1;
                }
            }
        }

        let positive_coverage = positive_hits as f64 / total_positive;
        let negative_coverage = negative_hits as f64 / total_negative;
        let score = match (positive_hits, negative_hits) {
            (0, 0) => {
                log::debug!("Skipping {}: it never fires", column.name);
                continue;
            }
            (_, 0) => f64::INFINITY,
            _ => positive_coverage / negative_coverage,
        };
        scores.push(DominanceScore {
            feature: column.name.to_string(),
            score,
            positive_coverage,
            negative_coverage,
        });
    }

    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Column, ColumnFamily, ColumnKind, ColumnName};

    fn indicator(category: &str, values: &[f64]) -> Column {
        Column::new(
            ColumnName::categorical(ColumnFamily::LiwcOriginal, category),
            ColumnKind::Indicator,
            values.to_vec(),
        )
    }

    fn matrix() -> EncodedFeatureMatrix {
        EncodedFeatureMatrix::new(
            4,
            vec![
                indicator("always_positive", &[1.0, 1.0, 0.0, 0.0]),
                indicator("balanced", &[1.0, 0.0, 1.0, 0.0]),
                indicator("never", &[0.0, 0.0, 0.0, 0.0]),
                indicator("mostly_negative", &[0.0, 1.0, 1.0, 1.0]),
                Column::new(
                    ColumnName::scalar(ColumnFamily::TextSimilarity),
                    ColumnKind::Scalar,
                    vec![0.3, -0.2, 1.0, 0.1],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scores_are_ranked() {
        let labels = Labels::Binary(vec![true, true, false, false]);
        let scores = dominance_scores(&matrix(), &labels).unwrap();
        let names: Vec<&str> = scores.iter().map(|s| s.feature.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "LIWC-original_always_positive",
                "LIWC-original_balanced",
                "LIWC-original_mostly_negative",
            ]
        );
        assert_eq!(scores[0].score, f64::INFINITY);
        assert_eq!(scores[1].score, 1.0);
        assert_eq!(scores[2].score, 0.5);
    }

    #[test]
    fn test_constant_indicators_are_skipped() {
        let matrix = EncodedFeatureMatrix::new(
            4,
            vec![
                indicator("everywhere", &[1.0, 1.0, 1.0, 1.0]),
                indicator("balanced", &[1.0, 0.0, 1.0, 0.0]),
            ],
        )
        .unwrap();
        let labels = Labels::Binary(vec![true, true, false, false]);
        let scores = dominance_scores(&matrix, &labels).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].feature, "LIWC-original_balanced");
    }

    #[test]
    fn test_continuous_labels_are_fatal() {
        let labels = Labels::Continuous(vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(
            dominance_scores(&matrix(), &labels).unwrap_err(),
            AnalysisError::NonBinaryLabels
        );
    }

    #[test]
    fn test_length_mismatch_is_fatal() {
        let labels = Labels::Binary(vec![true, false]);
        assert!(matches!(
            dominance_scores(&matrix(), &labels),
            Err(AnalysisError::LengthMismatch { rows: 4, labels: 2 })
        ));
    }
}
