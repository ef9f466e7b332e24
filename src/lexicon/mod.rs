//! Lexical resources loaded once at startup and shared read-only.
//!
//! - `levin`: Levin verb classes, compressed and broad-semantic views
//! - `liwc`: LIWC word categories with prefix wildcards
//! - `concreteness`: concreteness norms
//!
//! `LexiconContext` bundles all three. It is built once by the engine and
//! handed by reference to every component doing lookups; it is `Sync`, so
//! permutation workers can read it concurrently.

pub mod concreteness;
pub mod error;
pub mod levin;
pub mod liwc;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use concreteness::ConcretenessNorms;
pub use error::LexiconError;
pub use levin::{LevinClass, LevinLexicon};
pub use liwc::LiwcLexicon;

/// Where the lexicon files live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconPaths {
    pub levin_classes: PathBuf,
    pub levin_groups: PathBuf,
    pub liwc: PathBuf,
    pub concreteness: PathBuf,
}

impl Default for LexiconPaths {
    fn default() -> Self {
        Self {
            levin_classes: PathBuf::from("data/levin_verbs.txt"),
            levin_groups: PathBuf::from("data/levin_semantic_broad.json"),
            liwc: PathBuf::from("data/LIWC.2015.all.txt"),
            concreteness: PathBuf::from("data/concreteness.txt"),
        }
    }
}

/// Immutable bundle of every lexicon
#[derive(Debug, Clone)]
pub struct LexiconContext {
    pub levin: LevinLexicon,
    pub liwc: LiwcLexicon,
    pub concreteness: ConcretenessNorms,
}

impl LexiconContext {
    pub fn new(levin: LevinLexicon, liwc: LiwcLexicon, concreteness: ConcretenessNorms) -> Self {
        Self {
            levin,
            liwc,
            concreteness,
        }
    }

    /// Load every lexicon; any malformed file aborts
    pub fn load(paths: &LexiconPaths) -> Result<Self> {
        let levin = LevinLexicon::load(&paths.levin_classes, &paths.levin_groups)?;
        let liwc = LiwcLexicon::load(&paths.liwc)?;
        let concreteness = ConcretenessNorms::load(&paths.concreteness)?;
        Ok(Self::new(levin, liwc, concreteness))
    }

    /// Known English word forms, used to validate lemma candidates
    pub fn vocabulary(&self) -> HashSet<String> {
        self.concreteness
            .words()
            .chain(self.levin.verbs())
            .map(str::to_string)
            .collect()
    }
}
