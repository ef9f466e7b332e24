//! Noun lemmatization in the style of WordNet's morphological processor.
//!
//! Irregular plurals come from an exception table; everything else goes
//! through suffix detachment rules. With a vocabulary attached, a rule
//! candidate is only accepted when the vocabulary knows it, which is what
//! keeps "bus" from turning into "bu".

use std::collections::{HashMap, HashSet};

/// Maps an inflected word form to its base form
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, word: &str) -> String;
}

/// (suffix, replacement) pairs for nouns, tried in order
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("dice", "die"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("calves", "calf"),
    ("loaves", "loaf"),
    ("thieves", "thief"),
    ("sheep", "sheep"),
    ("fish", "fish"),
    ("deer", "deer"),
    ("series", "series"),
    ("species", "species"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("data", "datum"),
    ("criteria", "criterion"),
];

/// Endings where stripping a bare "s" without a vocabulary would be wrong
const SINGULAR_S_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Rule-based noun lemmatizer
#[derive(Debug, Clone)]
pub struct RuleLemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    vocabulary: Option<HashSet<String>>,
}

impl RuleLemmatizer {
    pub fn new() -> Self {
        Self {
            exceptions: NOUN_EXCEPTIONS.iter().copied().collect(),
            vocabulary: None,
        }
    }

    /// Only accept rule candidates that appear in `vocabulary`
    pub fn with_vocabulary(vocabulary: HashSet<String>) -> Self {
        Self {
            vocabulary: Some(vocabulary),
            ..Self::new()
        }
    }

    fn candidates<'w>(&self, word: &'w str) -> impl Iterator<Item = String> + 'w {
        NOUN_RULES.iter().filter_map(move |(suffix, replacement)| {
            word.strip_suffix(suffix)
                .filter(|stem| !stem.is_empty())
                .map(|stem| format!("{}{}", stem, replacement))
        })
    }
}

impl Default for RuleLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for RuleLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return lemma.to_string();
        }

        match &self.vocabulary {
            Some(vocabulary) => {
                if vocabulary.contains(word) {
                    return word.to_string();
                }
                self.candidates(word)
                    .find(|candidate| vocabulary.contains(candidate))
                    .unwrap_or_else(|| word.to_string())
            }
            None => {
                if word.len() <= 3 || SINGULAR_S_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
                    return word.to_string();
                }
                // Longest matching suffix wins when there is nothing to validate against
                NOUN_RULES
                    .iter()
                    .filter(|(suffix, _)| word.ends_with(suffix) && word.len() > suffix.len())
                    .max_by_key(|(suffix, _)| suffix.len())
                    .map(|(suffix, replacement)| {
                        format!("{}{}", &word[..word.len() - suffix.len()], replacement)
                    })
                    .unwrap_or_else(|| word.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceptions() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("mice"), "mouse");
        assert_eq!(lemmatizer.lemmatize("sheep"), "sheep");
    }

    #[test]
    fn test_rules_without_vocabulary() {
        let lemmatizer = RuleLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("cats"), "cat");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("churches"), "church");
        assert_eq!(lemmatizer.lemmatize("puppies"), "puppy");
        assert_eq!(lemmatizer.lemmatize("firemen"), "fireman");
        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
        assert_eq!(lemmatizer.lemmatize("bus"), "bus");
        assert_eq!(lemmatizer.lemmatize("sits"), "sit");
        assert_eq!(lemmatizer.lemmatize("a"), "a");
    }

    #[test]
    fn test_vocabulary_validates_candidates() {
        let vocabulary: HashSet<String> = ["horse", "bus", "knife", "glass"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let lemmatizer = RuleLemmatizer::with_vocabulary(vocabulary);

        // "horses" -> "horse" via the bare-s rule, not "hors" via "ses"
        assert_eq!(lemmatizer.lemmatize("horses"), "horse");
        assert_eq!(lemmatizer.lemmatize("buses"), "bus");
        assert_eq!(lemmatizer.lemmatize("glasses"), "glass");
        assert_eq!(lemmatizer.lemmatize("bus"), "bus");
        // unknown to the vocabulary: left alone
        assert_eq!(lemmatizer.lemmatize("zorbs"), "zorbs");
    }
}
