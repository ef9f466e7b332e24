//! Analysis modes selectable from the command line

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Positive/negative coverage ratio of binary features
    DominanceScore,
    /// Least squares on the score gap
    Ols,
    /// Ridge regression on the score gap
    Ridge,
    /// LinearSVC weights with permutation significance
    Svm,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 4] = [
        AnalysisMode::DominanceScore,
        AnalysisMode::Ols,
        AnalysisMode::Ridge,
        AnalysisMode::Svm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisMode::DominanceScore => "dominance-score",
            AnalysisMode::Ols => "ols",
            AnalysisMode::Ridge => "ridge",
            AnalysisMode::Svm => "svm",
        }
    }

    /// Whether original/replacement indicator pairs become delta columns
    pub fn merges_sides(&self) -> bool {
        !matches!(self, AnalysisMode::DominanceScore)
    }

    /// Whether the dependent variable is the score gap rather than the
    /// boolean prediction
    pub fn regresses_score_gap(&self) -> bool {
        matches!(self, AnalysisMode::Ols | AnalysisMode::Ridge)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| AnalysisError::UnknownMode(s.to_string()))
    }
}
