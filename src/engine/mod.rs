//! Analysis engine
//!
//! This module is organized into the following submodules:
//! - `constants`: Default paths and tunables
//! - `config`: YAML configuration (AnalysisConfig, PathsConfig, EmbedderConfig)
//! - `mode`: The analysis modes selectable from the command line
//! - `core`: AnalysisEngine, which loads resources and dispatches a mode

pub mod config;
pub mod constants;
pub mod core;
pub mod mode;


// Re-export main types for convenience
pub use config::{AnalysisConfig, EmbedderConfig, PathsConfig};
pub use constants::*;
pub use core::{AnalysisEngine, AnalysisOutcome, NumericFeatures};
pub use mode::AnalysisMode;
