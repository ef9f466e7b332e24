//! Permutation significance of LinearSvc coefficients.
//!
//! The classifier is fitted once on the real pairing of feature rows and
//! labels. Each trial then reorders the feature rows with an RNG seeded by
//! the trial index, keeps the labels in place, and refits. A feature's
//! significance is the number of trials whose coefficient magnitude is at
//! most the real one. Trials run on a rayon pool and are combined with an
//! order-independent sum, so the counts do not depend on the pool size.

use anyhow::{Context, Result};
use indicatif::ParallelProgressIterator;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::Labels;
use crate::features::EncodedFeatureMatrix;
use crate::models::{DesignMatrix, LinearSvc, SvcFit};
use crate::progress;

/// Default number of permutation trials
pub const DEFAULT_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceResult {
    pub feature: String,
    /// |coefficient| from the fit on the real pairing
    pub weight: f64,
    /// -1, 0 or 1
    pub sign: f64,
    /// trials with shuffled |coefficient| <= `weight`
    pub significance: usize,
}

#[derive(Debug, Clone)]
pub struct PermutationTest {
    pub iterations: usize,
    /// Pool size; `None` uses rayon's global pool
    pub workers: Option<usize>,
    pub classifier: LinearSvc,
}

impl Default for PermutationTest {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

/// Per-feature counts summed over trials
#[derive(Debug, Clone, PartialEq)]
struct TrialTally {
    counts: Vec<usize>,
    /// trials whose refit hit the iteration limit
    unconverged: usize,
}

impl TrialTally {
    fn empty(n_features: usize) -> Self {
        Self {
            counts: vec![0; n_features],
            unconverged: 0,
        }
    }

    fn merge(mut self, other: TrialTally) -> Self {
        for (total, count) in self.counts.iter_mut().zip(other.counts) {
            *total += count;
        }
        self.unconverged += other.unconverged;
        self
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl PermutationTest {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            workers: None,
            classifier: LinearSvc::default(),
        }
    }

    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn run(&self, matrix: &EncodedFeatureMatrix, labels: &Labels) -> Result<Vec<SignificanceResult>> {
        labels.check_rows(matrix.n_rows())?;
        let labels = labels.as_binary()?;
        let design = matrix.design_matrix()?;

        log::info!("Computing the coefficients with the real features");
        let truth = self
            .classifier
            .fit(&design, labels)
            .context("Failed to fit the classifier on the real features")?;
        if !truth.converged {
            log::warn!(
                "LinearSvc did not converge within {} iterations on the real features; consider more iterations",
                self.classifier.max_iter
            );
        }
        let magnitudes: Vec<f64> = truth.coefficients.iter().map(|w| w.abs()).collect();

        let tally = match self.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .context("Failed to build the permutation worker pool")?;
                pool.install(|| self.count_trials(&design, labels, &magnitudes))?
            }
            None => self.count_trials(&design, labels, &magnitudes)?,
        };
        if tally.unconverged > 0 {
            log::warn!(
                "LinearSvc did not converge within {} iterations in {} of {} permutation trials",
                self.classifier.max_iter,
                tally.unconverged,
                self.iterations
            );
        }

        Ok(matrix
            .names()
            .into_iter()
            .zip(&truth.coefficients)
            .zip(tally.counts)
            .map(|((feature, &coefficient), significance)| SignificanceResult {
                feature,
                weight: coefficient.abs(),
                sign: sign(coefficient),
                significance,
            })
            .collect())
    }

    /// Refit after reordering the feature rows with seed `trial`
    pub fn shuffled_fit(&self, design: &DesignMatrix, labels: &[bool], trial: usize) -> Result<SvcFit> {
        let mut rng = StdRng::seed_from_u64(trial as u64);
        let mut order: Vec<usize> = (0..design.n_rows()).collect();
        order.shuffle(&mut rng);
        Ok(self.classifier.fit(&design.select_rows(&order), labels)?)
    }

    fn count_trials(&self, design: &DesignMatrix, labels: &[bool], magnitudes: &[f64]) -> Result<TrialTally> {
        log::info!(
            "Running {} permutation trials on {} threads",
            self.iterations,
            rayon::current_num_threads()
        );
        let pb = progress::bar(self.iterations, "Computing the coefficients with shuffled rows");

        let tally = (0..self.iterations)
            .into_par_iter()
            .progress_with(pb.clone())
            .map(|trial| -> Result<TrialTally> {
                let fit = self.shuffled_fit(design, labels, trial)?;
                Ok(TrialTally {
                    counts: fit
                        .coefficients
                        .iter()
                        .zip(magnitudes)
                        .map(|(w, m)| usize::from(w.abs() <= *m))
                        .collect(),
                    unconverged: usize::from(!fit.converged),
                })
            })
            .try_reduce(|| TrialTally::empty(magnitudes.len()), |acc, trial| Ok(acc.merge(trial)))?;

        pb.finish_and_clear();
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Column, ColumnFamily, ColumnKind, ColumnName};

    fn fixture() -> (EncodedFeatureMatrix, Labels) {
        let labels: Vec<bool> = (0..24).map(|i| i % 3 != 0).collect();
        let informative: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let noise: Vec<f64> = (0..24).map(|i| ((i * 5) % 7) as f64 / 7.0 - 0.5).collect();
        let matrix = EncodedFeatureMatrix::new(
            24,
            vec![
                Column::new(
                    ColumnName::categorical(ColumnFamily::LiwcChange, "posemo"),
                    ColumnKind::Delta,
                    informative,
                ),
                Column::new(ColumnName::scalar(ColumnFamily::WordSimilarity), ColumnKind::Scalar, noise),
            ],
        )
        .unwrap();
        (matrix, Labels::Binary(labels))
    }

    #[test]
    fn test_counts_do_not_depend_on_pool_size() {
        let (matrix, labels) = fixture();
        let single = PermutationTest::new(20).with_workers(Some(1)).run(&matrix, &labels).unwrap();
        let pooled = PermutationTest::new(20).with_workers(Some(4)).run(&matrix, &labels).unwrap();
        let again = PermutationTest::new(20).with_workers(Some(4)).run(&matrix, &labels).unwrap();
        assert_eq!(single, pooled);
        assert_eq!(pooled, again);
    }

    #[test]
    fn test_informative_feature_is_significant() {
        let (matrix, labels) = fixture();
        let results = PermutationTest::new(30).with_workers(Some(2)).run(&matrix, &labels).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].feature, "LIWC_change_posemo");
        assert_eq!(results[0].sign, 1.0);
        assert!(results[0].significance >= 27);
        assert!(results.iter().all(|r| r.significance <= 30));
    }

    #[test]
    fn test_iteration_limit_is_tallied_across_trials() {
        let (matrix, labels) = fixture();
        let design = matrix.design_matrix().unwrap();
        let labels = labels.as_binary().unwrap();

        let mut capped = PermutationTest::new(6).with_workers(Some(2));
        capped.classifier.max_iter = 1;
        let tally = capped.count_trials(&design, labels, &[0.0, 0.0]).unwrap();
        assert_eq!(tally.unconverged, 6);
        assert_eq!(tally.counts.len(), 2);
    }

    #[test]
    fn test_continuous_labels_are_rejected() {
        let (matrix, _) = fixture();
        let labels = Labels::Continuous(vec![0.5; 24]);
        assert!(PermutationTest::new(2).run(&matrix, &labels).is_err());
    }
}
