//! Core AnalysisEngine: loads resources once and runs one analysis mode

use anyhow::{Context, Result};

use crate::analysis::permutation::PermutationTest;
use crate::analysis::report::{self, RankedFeature};
use crate::analysis::{dominance_scores, run_ols, run_ridge, DominanceScore, Labels, OlsReport, RidgeReport};
use crate::data::{Example, ResultsParser};
use crate::engine::config::AnalysisConfig;
use crate::engine::mode::AnalysisMode;
use crate::features::{EncodedFeatureMatrix, FeatureEncoder, FeatureExtractor, FeatureTable};
use crate::lexicon::LexiconContext;
use crate::text::{Embedder, RuleLemmatizer, TripletDisambiguator};

/// Raw table, encoded matrix and dependent variable for one mode
#[derive(Debug, Clone)]
pub struct NumericFeatures {
    pub table: FeatureTable,
    pub matrix: EncodedFeatureMatrix,
    pub labels: Labels,
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Dominance(Vec<DominanceScore>),
    Ols(OlsReport),
    Ridge(RidgeReport),
    Svm(Vec<RankedFeature>),
}

/// Owns the configuration, the lexicons and the embedder
pub struct AnalysisEngine {
    config: AnalysisConfig,
    lexicons: LexiconContext,
    embedder: Box<dyn Embedder>,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig, lexicons: LexiconContext, embedder: Box<dyn Embedder>) -> Self {
        Self {
            config,
            lexicons,
            embedder,
        }
    }

    /// Load every resource named by the config
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        let lexicons = LexiconContext::load(&config.paths.lexicons).context("Failed to load the lexicons")?;
        let embedder = config.embedder.build().context("Failed to set up the embedder")?;
        log::info!("Using embedder {}", embedder.model_name());
        Ok(Self::new(config, lexicons, embedder))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn lexicons(&self) -> &LexiconContext {
        &self.lexicons
    }

    /// Disambiguator whose lemmatizer only accepts known word forms
    pub fn disambiguator(&self) -> TripletDisambiguator {
        let lemmatizer = RuleLemmatizer::with_vocabulary(self.lexicons.vocabulary());
        TripletDisambiguator::new(Box::new(lemmatizer))
    }

    /// Read the results table, keeping at most `max_examples` rows
    pub fn load_examples(&self, max_examples: Option<usize>) -> Result<Vec<Example>> {
        let parser = ResultsParser::new(self.disambiguator());
        let mut examples = parser.parse_file(&self.config.paths.results)?;
        if let Some(max) = max_examples {
            if examples.len() > max {
                log::info!("Keeping the first {} of {} examples", max, examples.len());
                examples.truncate(max);
            }
        }
        Ok(examples)
    }

    pub fn compute_numeric_features(&self, examples: &[Example], mode: AnalysisMode) -> Result<NumericFeatures> {
        let extractor = FeatureExtractor::new(&self.lexicons, self.embedder.as_ref());
        let table = extractor.extract(examples)?;
        let matrix = FeatureEncoder::new(self.config.encoder_options(mode)).encode(&table)?;
        let labels = if mode.regresses_score_gap() {
            Labels::Continuous(table.score_gaps())
        } else {
            Labels::Binary(table.labels())
        };
        Ok(NumericFeatures { table, matrix, labels })
    }

    /// Extract, encode, analyse and report
    pub fn run(&self, examples: &[Example], mode: AnalysisMode) -> Result<AnalysisOutcome> {
        log::info!("Running the {} analysis on {} examples", mode, examples.len());
        let features = self.compute_numeric_features(examples, mode)?;
        println!("{}", report::metrics_summary(&self.lexicons, &features.table, &features.matrix));
        self.analyse(&features, mode)
    }

    pub fn analyse(&self, features: &NumericFeatures, mode: AnalysisMode) -> Result<AnalysisOutcome> {
        let NumericFeatures { table, matrix, labels } = features;
        match mode {
            AnalysisMode::DominanceScore => {
                let scores = dominance_scores(matrix, labels)?;
                println!("{}", report::format_dominance(&scores));
                Ok(AnalysisOutcome::Dominance(scores))
            }
            AnalysisMode::Ols => {
                let ols = run_ols(matrix, labels, table, self.config.significance_level)?;
                println!("{}", report::format_ols(&ols));
                Ok(AnalysisOutcome::Ols(ols))
            }
            AnalysisMode::Ridge => {
                let ridge = run_ridge(matrix, labels, self.config.ridge_alpha)?;
                println!("{}", report::format_ridge(&ridge));
                Ok(AnalysisOutcome::Ridge(ridge))
            }
            AnalysisMode::Svm => {
                let results = PermutationTest::new(self.config.iterations)
                    .with_workers(self.config.workers)
                    .run(matrix, labels)?;
                let ranked = report::rank_features(&results, &table.tally);
                report::write_ranking_csv(&self.config.paths.ranking_output, &ranked)?;
                report::write_coefficient_chart(&self.config.paths.chart_output, &results, self.config.top_features)?;
                Ok(AnalysisOutcome::Svm(ranked))
            }
        }
    }
}
