pub mod analysis;
pub mod data;
pub mod engine;
pub mod features;
pub mod lexicon;
pub mod models;
pub mod progress;
pub mod text;

pub use analysis::{AnalysisError, DominanceScore, Labels, PermutationTest, SignificanceResult};
pub use data::{DataError, Example, NegationType, ResultsParser, Triplet};
pub use engine::{AnalysisConfig, AnalysisEngine, AnalysisMode, AnalysisOutcome};
pub use features::{EncodedFeatureMatrix, EncoderOptions, FeatureEncoder, FeatureExtractor, FeatureRecord, FeatureTable};
pub use lexicon::{LexiconContext, LexiconError, LexiconPaths};
pub use models::{LinearSvc, Ols, Ridge};
pub use text::{Embedder, HashingEmbedder, PrecomputedEmbedder, TripletDisambiguator};
