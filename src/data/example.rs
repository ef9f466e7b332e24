use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning raw result rows into examples
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Unknown negation type {0:?}: must be one of {{subject, verb, object}} (s, v, o)")]
    UnknownNegationType(String),

    #[error("Malformed triplet {0:?}: expected exactly three comma-separated tokens")]
    MalformedTriplet(String),

    #[error("Malformed triplet list {0:?}")]
    MalformedTripletList(String),
}

/// An ordered (subject, verb, object) token tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub verb: String,
    pub object: String,
}

impl Triplet {
    pub fn new(subject: impl Into<String>, verb: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            verb: verb.into(),
            object: object.into(),
        }
    }

    /// Parse a comma-joined triplet such as `"cat,sit,mat"`.
    ///
    /// Tokens are kept verbatim (no trimming, no case folding); they have to
    /// match sentence tokens exactly during disambiguation.
    pub fn parse(joined: &str) -> Result<Self, DataError> {
        let parts: Vec<&str> = joined.split(',').collect();
        match parts.as_slice() {
            [subject, verb, object] => Ok(Self::new(*subject, *verb, *object)),
            _ => Err(DataError::MalformedTriplet(joined.to_string())),
        }
    }

    pub fn tokens(&self) -> [&str; 3] {
        [&self.subject, &self.verb, &self.object]
    }

    /// The token in the slot that a negation of `negation_type` alters
    pub fn slot(&self, negation_type: NegationType) -> &str {
        self.tokens()[negation_type.slot_index()]
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.subject, self.verb, self.object)
    }
}

/// Which slot differs between the positive and the negative triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NegationType {
    Subject,
    Verb,
    Object,
}

impl NegationType {
    pub const ALL: [NegationType; 3] = [NegationType::Subject, NegationType::Verb, NegationType::Object];

    /// Parse the raw column value; only its first character is significant.
    pub fn from_code(raw: &str) -> Result<Self, DataError> {
        match raw.chars().next() {
            Some('s') => Ok(NegationType::Subject),
            Some('v') => Ok(NegationType::Verb),
            Some('o') => Ok(NegationType::Object),
            _ => Err(DataError::UnknownNegationType(raw.to_string())),
        }
    }

    pub fn code(&self) -> char {
        match self {
            NegationType::Subject => 's',
            NegationType::Verb => 'v',
            NegationType::Object => 'o',
        }
    }

    pub fn slot_index(&self) -> usize {
        match self {
            NegationType::Subject => 0,
            NegationType::Verb => 1,
            NegationType::Object => 2,
        }
    }
}

impl fmt::Display for NegationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegationType::Subject => "subject",
            NegationType::Verb => "verb",
            NegationType::Object => "object",
        };
        f.write_str(name)
    }
}

/// One scored sentence pair with its resolved triplets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub id: i64,
    pub sentence: String,
    pub negated_sentence: String,
    pub positive_triplet: Triplet,
    pub negative_triplet: Triplet,
    pub negation_type: NegationType,
    /// Whether the model preferred the positive sentence
    pub model_prediction: bool,
    pub model_score_gap: f64,
}

impl Example {
    /// The (original, replacement) word pair at the negated slot
    pub fn swapped_words(&self) -> (&str, &str) {
        (
            self.positive_triplet.slot(self.negation_type),
            self.negative_triplet.slot(self.negation_type),
        )
    }
}
