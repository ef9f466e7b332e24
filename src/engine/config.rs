//! Analysis configuration, read from YAML

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::permutation::DEFAULT_ITERATIONS;
use crate::engine::constants::*;
use crate::engine::mode::AnalysisMode;
use crate::features::encoder::{EncoderOptions, DEFAULT_MIN_NON_ZERO};
use crate::lexicon::LexiconPaths;
use crate::text::{Embedder, HashingEmbedder, PrecomputedEmbedder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Model results table (CSV, optionally gzipped)
    pub results: PathBuf,
    pub lexicons: LexiconPaths,
    /// Ranked feature CSV written by the svm mode
    pub ranking_output: PathBuf,
    /// Coefficient chart written by the svm mode
    pub chart_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results: PathBuf::from(DEFAULT_RESULTS_PATH),
            lexicons: LexiconPaths::default(),
            ranking_output: PathBuf::from(DEFAULT_RANKING_PATH),
            chart_output: PathBuf::from(DEFAULT_CHART_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbedderConfig {
    Hashing { dimension: usize },
    Precomputed { path: PathBuf },
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        EmbedderConfig::Hashing {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

impl EmbedderConfig {
    pub fn build(&self) -> Result<Box<dyn Embedder>> {
        Ok(match self {
            EmbedderConfig::Hashing { dimension } => Box::new(HashingEmbedder::new(*dimension)),
            EmbedderConfig::Precomputed { path } => Box::new(PrecomputedEmbedder::load(path)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathsConfig,
    pub feature_min_non_zero: usize,
    pub debug_max_examples: usize,
    /// Permutation trials, svm mode only
    pub iterations: usize,
    pub top_features: usize,
    pub ridge_alpha: f64,
    pub significance_level: f64,
    /// Permutation pool size; all cores when unset
    pub workers: Option<usize>,
    pub embedder: EmbedderConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            feature_min_non_zero: DEFAULT_MIN_NON_ZERO,
            debug_max_examples: DEFAULT_DEBUG_MAX_EXAMPLES,
            iterations: DEFAULT_ITERATIONS,
            top_features: DEFAULT_TOP_FEATURES,
            ridge_alpha: DEFAULT_RIDGE_ALPHA,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            workers: None,
            embedder: EmbedderConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a YAML config; a missing file falls back to the defaults
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let yaml_str = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_yaml(&yaml_str)
            .map_err(|e| anyhow!("Invalid YAML config in {}: {}", path.display(), e))?;

        log::info!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.workers == Some(0) {
            return Err(anyhow!("workers must be at least 1"));
        }
        Ok(config)
    }

    pub fn encoder_options(&self, mode: AnalysisMode) -> EncoderOptions {
        EncoderOptions {
            merge: mode.merges_sides(),
            min_non_zero: self.feature_min_non_zero,
        }
    }
}
