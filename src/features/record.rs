//! Per-example raw features, before numeric encoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::NegationType;

/// Names of the raw feature columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawFeature {
    WordOriginal,
    WordReplacement,
    NegationType,
    LevinOriginal,
    LevinReplacement,
    LiwcOriginal,
    LiwcReplacement,
    ConcretenessOriginal,
    ConcretenessReplacement,
    TextSimilarity,
    WordSimilarity,
    Label,
    ScoreGap,
}

impl RawFeature {
    pub fn name(&self) -> &'static str {
        match self {
            RawFeature::WordOriginal => "word_original",
            RawFeature::WordReplacement => "word_replacement",
            RawFeature::NegationType => "neg_type",
            RawFeature::LevinOriginal => "Levin-original",
            RawFeature::LevinReplacement => "Levin-replacement",
            RawFeature::LiwcOriginal => "LIWC-original",
            RawFeature::LiwcReplacement => "LIWC-replacement",
            RawFeature::ConcretenessOriginal => "concreteness-original",
            RawFeature::ConcretenessReplacement => "concreteness-replacement",
            RawFeature::TextSimilarity => "text_similarity",
            RawFeature::WordSimilarity => "word_similarity",
            RawFeature::Label => "label",
            RawFeature::ScoreGap => "clip-score-diff",
        }
    }
}

/// A raw feature value, tagged by family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Text(&'a str),
    Categories(&'a [String]),
    Scalar(f64),
    Flag(bool),
}

/// Everything known about one example's word swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: i64,
    pub word_original: String,
    pub word_replacement: String,
    pub negation_type: NegationType,
    pub levin_original: Vec<String>,
    pub levin_replacement: Vec<String>,
    pub liwc_original: Vec<String>,
    pub liwc_replacement: Vec<String>,
    /// NaN when the word has no norm
    pub concreteness_original: f64,
    pub concreteness_replacement: f64,
    /// NaN when the negated sentence is empty
    pub text_similarity: f64,
    pub word_similarity: f64,
    pub label: bool,
    pub score_gap: f64,
}

impl FeatureRecord {
    pub fn value(&self, feature: RawFeature) -> FeatureValue<'_> {
        match feature {
            RawFeature::WordOriginal => FeatureValue::Text(&self.word_original),
            RawFeature::WordReplacement => FeatureValue::Text(&self.word_replacement),
            RawFeature::NegationType => FeatureValue::Text(match self.negation_type {
                NegationType::Subject => "s",
                NegationType::Verb => "v",
                NegationType::Object => "o",
            }),
            RawFeature::LevinOriginal => FeatureValue::Categories(&self.levin_original),
            RawFeature::LevinReplacement => FeatureValue::Categories(&self.levin_replacement),
            RawFeature::LiwcOriginal => FeatureValue::Categories(&self.liwc_original),
            RawFeature::LiwcReplacement => FeatureValue::Categories(&self.liwc_replacement),
            RawFeature::ConcretenessOriginal => FeatureValue::Scalar(self.concreteness_original),
            RawFeature::ConcretenessReplacement => FeatureValue::Scalar(self.concreteness_replacement),
            RawFeature::TextSimilarity => FeatureValue::Scalar(self.text_similarity),
            RawFeature::WordSimilarity => FeatureValue::Scalar(self.word_similarity),
            RawFeature::Label => FeatureValue::Flag(self.label),
            RawFeature::ScoreGap => FeatureValue::Scalar(self.score_gap),
        }
    }

    /// Category labels of a categorical feature; empty for other families
    pub fn categories(&self, feature: RawFeature) -> &[String] {
        match self.value(feature) {
            FeatureValue::Categories(categories) => categories,
            _ => &[],
        }
    }

    /// Numeric value of a scalar feature; NaN for other families
    pub fn scalar(&self, feature: RawFeature) -> f64 {
        match self.value(feature) {
            FeatureValue::Scalar(value) => value,
            FeatureValue::Flag(flag) => f64::from(u8::from(flag)),
            _ => f64::NAN,
        }
    }
}

/// Multiset of every label assigned across examples and slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelTally {
    counts: BTreeMap<String, usize>,
}

impl LabelTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        self.add_many(label, 1);
    }

    pub fn add_many(&mut self, label: &str, times: usize) {
        if times > 0 {
            *self.counts.entry(label.to_string()).or_insert(0) += times;
        }
    }

    /// Multiplicity of `label` (0 when never assigned)
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, &count)| (label.as_str(), count))
    }
}

/// The raw feature table: one record per example plus label provenance
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub records: Vec<FeatureRecord>,
    pub tally: LabelTally,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> Vec<bool> {
        self.records.iter().map(|record| record.label).collect()
    }

    pub fn score_gaps(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.score_gap).collect()
    }
}
