//! Builds one `FeatureRecord` per example from the lexicons and embeddings.

use anyhow::{Context, Result};
use thiserror::Error;

use crate::data::{Example, NegationType};
use crate::features::record::{FeatureRecord, FeatureTable, LabelTally, RawFeature};
use crate::lexicon::LexiconContext;
use crate::progress;
use crate::text::{pairwise_cosine_similarity, Embedder};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Example {id}: empty {side} word at the {negation_type} slot")]
    EmptyWord {
        id: i64,
        side: &'static str,
        negation_type: NegationType,
    },
}

/// Extracts raw features for a batch of examples
pub struct FeatureExtractor<'a> {
    lexicons: &'a LexiconContext,
    embedder: &'a dyn Embedder,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(lexicons: &'a LexiconContext, embedder: &'a dyn Embedder) -> Self {
        Self { lexicons, embedder }
    }

    /// The (original, replacement) words, rejecting empty ones
    pub fn swapped_words(example: &Example) -> Result<(&str, &str), FeatureError> {
        let (original, replacement) = example.swapped_words();
        for (word, side) in [(original, "original"), (replacement, "replacement")] {
            if word.is_empty() {
                return Err(FeatureError::EmptyWord {
                    id: example.id,
                    side,
                    negation_type: example.negation_type,
                });
            }
        }
        Ok((original, replacement))
    }

    /// Levin classes of a word, only consulted for verb swaps
    fn levin_classes(&self, word: &str, negation_type: NegationType) -> Vec<String> {
        match negation_type {
            NegationType::Verb => self.lexicons.levin.classes_of(word),
            NegationType::Subject | NegationType::Object => Vec::new(),
        }
    }

    /// Sentence/negated-sentence cosine similarity for the whole batch
    fn text_similarities(&self, examples: &[Example]) -> Result<Vec<f64>> {
        let sentences: Vec<String> = examples.iter().map(|e| e.sentence.clone()).collect();
        let negated: Vec<String> = examples.iter().map(|e| e.negated_sentence.clone()).collect();

        let embedded = self.embedder.embed(&sentences).context("Failed to embed sentences")?;
        let embedded_negated = self
            .embedder
            .embed(&negated)
            .context("Failed to embed negated sentences")?;

        let mut similarities = pairwise_cosine_similarity(&embedded, &embedded_negated)?;
        for (similarity, negated_sentence) in similarities.iter_mut().zip(&negated) {
            if negated_sentence.is_empty() {
                *similarity = f64::NAN;
            }
        }
        Ok(similarities)
    }

    fn word_similarities(&self, originals: &[String], replacements: &[String]) -> Result<Vec<f64>> {
        let embedded = self.embedder.embed(originals).context("Failed to embed original words")?;
        let embedded_replacements = self
            .embedder
            .embed(replacements)
            .context("Failed to embed replacement words")?;
        pairwise_cosine_similarity(&embedded, &embedded_replacements)
    }

    pub fn extract(&self, examples: &[Example]) -> Result<FeatureTable> {
        log::info!(
            "Extracting features for {} examples with {}",
            examples.len(),
            self.embedder.model_name()
        );

        let text_similarities = self.text_similarities(examples)?;

        let pb = progress::bar(examples.len(), "Computing the features");
        let mut records = Vec::with_capacity(examples.len());
        for (example, text_similarity) in examples.iter().zip(text_similarities) {
            let (original, replacement) = Self::swapped_words(example)?;
            let lexicons = self.lexicons;

            records.push(FeatureRecord {
                id: example.id,
                word_original: original.to_string(),
                word_replacement: replacement.to_string(),
                negation_type: example.negation_type,
                levin_original: self.levin_classes(original, example.negation_type),
                levin_replacement: self.levin_classes(replacement, example.negation_type),
                liwc_original: lexicons.liwc.categories_of(original),
                liwc_replacement: lexicons.liwc.categories_of(replacement),
                concreteness_original: lexicons.concreteness.score(original),
                concreteness_replacement: lexicons.concreteness.score(replacement),
                text_similarity,
                word_similarity: f64::NAN,
                label: example.model_prediction,
                score_gap: example.model_score_gap,
            });
            pb.inc(1);
        }
        pb.finish_and_clear();

        let originals: Vec<String> = records.iter().map(|r| r.word_original.clone()).collect();
        let replacements: Vec<String> = records.iter().map(|r| r.word_replacement.clone()).collect();
        let word_similarities = self.word_similarities(&originals, &replacements)?;
        for (record, similarity) in records.iter_mut().zip(word_similarities) {
            record.word_similarity = similarity;
        }

        let tally = tally_labels(&records);
        log::debug!("Assigned {} category labels in total", tally.total());
        Ok(FeatureTable { records, tally })
    }
}

/// Count every assigned label, plus one entry per row for each scalar feature
pub fn tally_labels(records: &[FeatureRecord]) -> LabelTally {
    let mut tally = LabelTally::new();
    let categorical = [
        RawFeature::LevinOriginal,
        RawFeature::LevinReplacement,
        RawFeature::LiwcOriginal,
        RawFeature::LiwcReplacement,
    ];
    for feature in categorical {
        for record in records {
            for label in record.categories(feature) {
                tally.add(label);
            }
        }
    }
    for record in records {
        tally.add(&format!("neg_type-{}", record.negation_type.code()));
    }
    for feature in [
        RawFeature::TextSimilarity,
        RawFeature::WordSimilarity,
        RawFeature::ConcretenessOriginal,
        RawFeature::ConcretenessReplacement,
    ] {
        tally.add_many(feature.name(), records.len());
    }
    tally
}
