//! Concreteness norms: word -> mean concreteness rating.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::Result;

use crate::data::source;
use crate::lexicon::error::LexiconError;

/// Tab-separated fields per row in the norms table
pub const NORMS_FIELD_COUNT: usize = 9;

/// Column holding the mean rating
pub const MEAN_RATING_COLUMN: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct ConcretenessNorms {
    scores: HashMap<String, f64>,
}

impl ConcretenessNorms {
    pub fn from_map(scores: HashMap<String, f64>) -> Self {
        Self { scores }
    }

    /// Parse the table, skipping its header row
    pub fn parse<R: BufRead>(reader: R, source_name: &str) -> Result<Self, LexiconError> {
        let mut scores = HashMap::new();
        for (idx, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            let line = line.trim_end_matches(&['\r', '\n'][..]);
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != NORMS_FIELD_COUNT {
                return Err(LexiconError::malformed(
                    source_name,
                    idx + 1,
                    format!("expected {} tab-separated fields, found {}", NORMS_FIELD_COUNT, fields.len()),
                ));
            }
            let rating: f64 = fields[MEAN_RATING_COLUMN].trim().parse().map_err(|_| {
                LexiconError::malformed(
                    source_name,
                    idx + 1,
                    format!("non-numeric mean rating {:?}", fields[MEAN_RATING_COLUMN]),
                )
            })?;
            scores.insert(fields[0].to_string(), rating);
        }
        Ok(Self { scores })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let norms = Self::parse(source::open_text(path)?, &path.display().to_string())?;
        log::info!("Loaded concreteness norms for {} words", norms.len());
        Ok(norms)
    }

    /// Mean rating, or NaN when the word has no norm
    pub fn score(&self, word: &str) -> f64 {
        self.scores.get(word).copied().unwrap_or(f64::NAN)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
