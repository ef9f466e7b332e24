//! Sentence/word embedding collaborators and cosine similarity.
//!
//! ```text
//! Embedder (trait)
//! ├── embed(&[String]) -> Vec<Vec<f32>>   // always batched
//! ├── dimension() -> usize
//! └── model_name() -> &str
//!
//! HashingEmbedder      // character trigrams hashed into a fixed-width vector
//! PrecomputedEmbedder  // {text: vector} table exported from an external model
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};

use crate::data::source;

/// Turns texts into fixed-length vectors, one batch at a time
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Cosine similarity of two vectors; 0 when either has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

/// Row-wise cosine similarity of two equally long batches
pub fn pairwise_cosine_similarity(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(anyhow!(
            "Cannot pair {} embeddings with {} embeddings",
            a.len(),
            b.len()
        ));
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| cosine_similarity(x, y)).collect())
}

/// Deterministic bag-of-character-trigrams embedder.
///
/// Each padded trigram is hashed into one of `dimension` buckets with a
/// hash-derived sign, then the vector is L2-normalised. Texts sharing
/// spelling share buckets, so similarity tracks surface overlap.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            model_name: format!("hashing-trigram-{}", dimension.max(1)),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        let padded: Vec<char> = format!("  {}  ", text).chars().collect();

        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            let hash = trigram_hash(&trigram);
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

/// Leading 8 bytes of the SHA-256 digest, big-endian
fn trigram_hash(trigram: &str) -> u64 {
    let digest = Sha256::digest(trigram.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Embeddings looked up from a precomputed `{text: [f32, ...]}` JSON table
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
    model_name: String,
}

impl PrecomputedEmbedder {
    pub fn from_map(vectors: HashMap<String, Vec<f32>>, model_name: impl Into<String>) -> Result<Self> {
        let dimension = vectors.values().next().map(Vec::len).unwrap_or(0);
        if let Some((text, vector)) = vectors.iter().find(|(_, v)| v.len() != dimension) {
            return Err(anyhow!(
                "Embedding for {:?} has {} dimensions, expected {}",
                text,
                vector.len(),
                dimension
            ));
        }
        Ok(Self {
            vectors,
            dimension,
            model_name: model_name.into(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = source::read_to_string(path)?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid embedding table in {}", path.display()))?;
        log::info!("Loaded {} precomputed embeddings from {}", vectors.len(), path.display());
        Self::from_map(vectors, path.display().to_string())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl Embedder for PrecomputedEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .ok_or_else(|| anyhow!("No precomputed embedding for {:?}", text))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_pairwise_requires_equal_batches() {
        let a = vec![vec![1.0f32, 0.0], vec![0.0, 1.0]];
        let b = vec![vec![1.0f32, 0.0], vec![1.0, 0.0]];
        let sims = pairwise_cosine_similarity(&a, &b).unwrap();
        assert!((sims[0] - 1.0).abs() < 1e-12);
        assert!(sims[1].abs() < 1e-12);
        assert!(pairwise_cosine_similarity(&a, &b[..1]).is_err());
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let first = embedder.embed(&texts(&["a cat sits on a mat"])).unwrap();
        let second = embedder.embed(&texts(&["a cat sits on a mat"])).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].len(), 64);
        let norm: f32 = first[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_embedder_buckets_are_pinned() {
        // "  x  " -> "  x" (bucket 4, -), " x " (bucket 7, -), "x  " (bucket 6, +)
        let vector = HashingEmbedder::new(8).embed(&texts(&["x"])).unwrap().remove(0);
        let unit = 1.0 / 3.0f32.sqrt();
        let expected = [0.0, 0.0, 0.0, 0.0, -unit, 0.0, unit, -unit];
        for (got, want) in vector.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{:?}", vector);
        }
    }

    #[test]
    fn test_hashing_embedder_tracks_overlap() {
        let embedder = HashingEmbedder::default();
        let vectors = embedder
            .embed(&texts(&["a cat sits on a mat", "a dog sits on a mat", "zebras gallop"]))
            .unwrap();
        let close = cosine_similarity(&vectors[0], &vectors[1]);
        let far = cosine_similarity(&vectors[0], &vectors[2]);
        assert!(close > far);
    }

    #[test]
    fn test_precomputed_embedder() {
        let mut vectors = HashMap::new();
        vectors.insert("cat".to_string(), vec![1.0, 0.0]);
        vectors.insert("dog".to_string(), vec![0.8, 0.6]);
        let embedder = PrecomputedEmbedder::from_map(vectors, "fixture").unwrap();
        assert_eq!(embedder.dimension(), 2);

        let out = embedder.embed(&texts(&["dog", "cat"])).unwrap();
        assert_eq!(out[0], vec![0.8, 0.6]);
        assert!(embedder.embed(&texts(&["bird"])).is_err());
    }

    #[test]
    fn test_precomputed_rejects_ragged_table() {
        let mut vectors = HashMap::new();
        vectors.insert("cat".to_string(), vec![1.0, 0.0]);
        vectors.insert("dog".to_string(), vec![0.8]);
        assert!(PrecomputedEmbedder::from_map(vectors, "ragged").is_err());
    }
}
