//! Encoded column names.
//!
//! Names follow `<family>_<category>` for categorical columns, e.g.
//! `Levin-original_9.1 Put Verbs`, `LIWC-replacement_posemo`,
//! `LIWC_change_posemo`, and the bare family name for scalar columns
//! (`concreteness-change`, `text_similarity`, `word_similarity`).

use std::fmt;

use crate::features::record::RawFeature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnFamily {
    LevinOriginal,
    LevinReplacement,
    LiwcOriginal,
    LiwcReplacement,
    LevinChange,
    LiwcChange,
    ConcretenessChange,
    TextSimilarity,
    WordSimilarity,
}

impl ColumnFamily {
    const CATEGORICAL: [ColumnFamily; 6] = [
        ColumnFamily::LevinOriginal,
        ColumnFamily::LevinReplacement,
        ColumnFamily::LiwcOriginal,
        ColumnFamily::LiwcReplacement,
        ColumnFamily::LevinChange,
        ColumnFamily::LiwcChange,
    ];

    const SCALAR: [ColumnFamily; 3] = [
        ColumnFamily::ConcretenessChange,
        ColumnFamily::TextSimilarity,
        ColumnFamily::WordSimilarity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnFamily::LevinOriginal => "Levin-original",
            ColumnFamily::LevinReplacement => "Levin-replacement",
            ColumnFamily::LiwcOriginal => "LIWC-original",
            ColumnFamily::LiwcReplacement => "LIWC-replacement",
            ColumnFamily::LevinChange => "Levin_change",
            ColumnFamily::LiwcChange => "LIWC_change",
            ColumnFamily::ConcretenessChange => "concreteness-change",
            ColumnFamily::TextSimilarity => "text_similarity",
            ColumnFamily::WordSimilarity => "word_similarity",
        }
    }

    /// Source lexicon or measurement the column derives from
    pub fn prefix(&self) -> &'static str {
        match self {
            ColumnFamily::LevinOriginal | ColumnFamily::LevinReplacement | ColumnFamily::LevinChange => "Levin",
            ColumnFamily::LiwcOriginal | ColumnFamily::LiwcReplacement | ColumnFamily::LiwcChange => "LIWC",
            ColumnFamily::ConcretenessChange => "concreteness",
            ColumnFamily::TextSimilarity => "text_similarity",
            ColumnFamily::WordSimilarity => "word_similarity",
        }
    }

    /// Family a raw feature is encoded into, if it is encoded directly
    pub fn for_raw(feature: RawFeature) -> Option<Self> {
        match feature {
            RawFeature::LevinOriginal => Some(ColumnFamily::LevinOriginal),
            RawFeature::LevinReplacement => Some(ColumnFamily::LevinReplacement),
            RawFeature::LiwcOriginal => Some(ColumnFamily::LiwcOriginal),
            RawFeature::LiwcReplacement => Some(ColumnFamily::LiwcReplacement),
            RawFeature::TextSimilarity => Some(ColumnFamily::TextSimilarity),
            RawFeature::WordSimilarity => Some(ColumnFamily::WordSimilarity),
            _ => None,
        }
    }

    /// (replacement family, merged family) for an original-side family
    pub fn counterpart(&self) -> Option<(ColumnFamily, ColumnFamily)> {
        match self {
            ColumnFamily::LevinOriginal => Some((ColumnFamily::LevinReplacement, ColumnFamily::LevinChange)),
            ColumnFamily::LiwcOriginal => Some((ColumnFamily::LiwcReplacement, ColumnFamily::LiwcChange)),
            _ => None,
        }
    }

    /// Raw features on each side of a word swap; for reporting example words
    pub fn raw_sides(&self) -> Option<(RawFeature, RawFeature)> {
        match self.prefix() {
            "Levin" => Some((RawFeature::LevinOriginal, RawFeature::LevinReplacement)),
            "LIWC" => Some((RawFeature::LiwcOriginal, RawFeature::LiwcReplacement)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnName {
    pub family: ColumnFamily,
    pub category: Option<String>,
}

impl ColumnName {
    pub fn categorical(family: ColumnFamily, category: impl Into<String>) -> Self {
        Self {
            family,
            category: Some(category.into()),
        }
    }

    pub fn scalar(family: ColumnFamily) -> Self {
        Self { family, category: None }
    }

    /// Recover family and category from a rendered name
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(family) = ColumnFamily::SCALAR.iter().find(|f| f.name() == name) {
            return Some(Self::scalar(*family));
        }
        ColumnFamily::CATEGORICAL.iter().find_map(|family| {
            name.strip_prefix(family.name())
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|category| Self::categorical(*family, category))
        })
    }

    /// Key under which the label tally counts this column's data
    pub fn tally_key(&self) -> &str {
        match (&self.category, self.family) {
            (Some(category), _) => category.as_str(),
            // The change column is derived from the original-side norm
            (None, ColumnFamily::ConcretenessChange) => RawFeature::ConcretenessOriginal.name(),
            (None, family) => family.name(),
        }
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(f, "{}_{}", self.family.name(), category),
            None => f.write_str(self.family.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_and_parse() {
        let names = [
            ColumnName::categorical(ColumnFamily::LevinOriginal, "9.1 Put Verbs"),
            ColumnName::categorical(ColumnFamily::LiwcReplacement, "posemo"),
            ColumnName::categorical(ColumnFamily::LiwcChange, "social_words"),
            ColumnName::scalar(ColumnFamily::ConcretenessChange),
            ColumnName::scalar(ColumnFamily::TextSimilarity),
        ];
        for name in names {
            assert_eq!(ColumnName::parse(&name.to_string()), Some(name));
        }
        assert_eq!(ColumnName::parse("unknown_column"), None);
    }

    #[test]
    fn test_rendered_names() {
        assert_eq!(
            ColumnName::categorical(ColumnFamily::LevinChange, "13.1 Give Verbs").to_string(),
            "Levin_change_13.1 Give Verbs"
        );
        assert_eq!(
            ColumnName::categorical(ColumnFamily::LiwcOriginal, "posemo").to_string(),
            "LIWC-original_posemo"
        );
    }

    #[test]
    fn test_prefix_and_tally_key() {
        let merged = ColumnName::parse("LIWC_change_posemo").unwrap();
        assert_eq!(merged.family.prefix(), "LIWC");
        assert_eq!(merged.tally_key(), "posemo");

        let similarity = ColumnName::parse("word_similarity").unwrap();
        assert_eq!(similarity.family.prefix(), "word_similarity");
        assert_eq!(similarity.tally_key(), "word_similarity");
    }
}
