//! Picks which candidate triplet a rendered sentence actually expresses.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};

use crate::data::Triplet;
use crate::text::lemmatizer::{Lemmatizer, RuleLemmatizer};

/// Resolves a list of candidate triplets against a sentence.
///
/// A candidate matches when each of its three tokens appears among the
/// sentence's tokens, their lemmas, or their stems.
pub struct TripletDisambiguator {
    lemmatizer: Box<dyn Lemmatizer>,
    stemmer: Stemmer,
}

impl TripletDisambiguator {
    pub fn new(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        Self {
            lemmatizer,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lemma with the one irregular form the noun lemmatizer gets wrong
    pub fn lemmatize(&self, word: &str) -> String {
        if word == "people" {
            "person".to_string()
        } else {
            self.lemmatizer.lemmatize(word)
        }
    }

    /// Stem without case folding
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }

    /// Every whitespace token of `sentence` plus its lemma and its stem
    pub fn token_set(&self, sentence: &str) -> HashSet<String> {
        let mut tokens = HashSet::new();
        for word in sentence.split_whitespace() {
            tokens.insert(self.lemmatize(word));
            tokens.insert(self.stem(word));
            tokens.insert(word.to_string());
        }
        tokens
    }

    /// Choose the candidate matching `sentence`.
    ///
    /// A single candidate is returned as-is. Otherwise the first full match
    /// wins, and when nothing matches the first candidate is used. Returns
    /// `None` only for an empty candidate list.
    pub fn resolve<'a>(&self, candidates: &'a [Triplet], sentence: &str) -> Option<&'a Triplet> {
        match candidates {
            [] => None,
            [only] => Some(only),
            [first, ..] => {
                let tokens = self.token_set(sentence);
                let matched = candidates
                    .iter()
                    .find(|triplet| triplet.tokens().iter().all(|token| tokens.contains(*token)));
                if matched.is_none() {
                    log::debug!(
                        "No candidate triplet fully matches {:?}; using {}",
                        sentence, first
                    );
                }
                Some(matched.unwrap_or(first))
            }
        }
    }
}

impl Default for TripletDisambiguator {
    fn default() -> Self {
        Self::new(Box::new(RuleLemmatizer::new()))
    }
}
