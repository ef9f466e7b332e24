//! Text processing: lemmatization, triplet disambiguation and embeddings
//!
//! - `lemmatizer`: noun lemmatizer behind the `Lemmatizer` trait
//! - `disambiguator`: resolves candidate triplets against a sentence
//! - `embedding`: `Embedder` trait, cosine similarity, bundled embedders

pub mod disambiguator;
pub mod embedding;
pub mod lemmatizer;

pub use disambiguator::TripletDisambiguator;
pub use embedding::{
    cosine_similarity, pairwise_cosine_similarity, Embedder, HashingEmbedder, PrecomputedEmbedder,
};
pub use lemmatizer::{Lemmatizer, RuleLemmatizer};
