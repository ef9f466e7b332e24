//! Default locations and tunables shared by the config and the binary

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "configs/analysis.yaml";

pub const DEFAULT_RESULTS_PATH: &str = "data/merged.csv";
pub const DEFAULT_RANKING_PATH: &str = "data/sorted_features.csv";
pub const DEFAULT_CHART_PATH: &str = "data/coef_importance.svg";

pub const DEFAULT_DEBUG_MAX_EXAMPLES: usize = 1000;
pub const DEFAULT_TOP_FEATURES: usize = 5;
pub const DEFAULT_RIDGE_ALPHA: f64 = 0.1;
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
