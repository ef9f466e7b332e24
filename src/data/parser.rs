use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::data::example::{DataError, Example, NegationType, Triplet};
use crate::data::source;
use crate::text::TripletDisambiguator;

/// Prediction value meaning the model preferred the positive sentence
const POSITIVE_PREDICTION: &str = "pos";

/// One row of the model results table, before any cleaning
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Unnamed: 0")]
    id: i64,
    sentence: Option<String>,
    neg_sentence: Option<String>,
    pos_triplet: Option<String>,
    neg_triplet: Option<String>,
    neg_type: Option<String>,
    #[serde(rename = "clip prediction")]
    prediction: Option<String>,
    clip_score_diff: f64,
}

/// Lower-case and strip ASCII punctuation
pub fn normalize_sentence(sentence: &str) -> String {
    sentence
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}

fn quoted_string_regex() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| {
        Regex::new(r#"'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)""#).expect("valid quoted-string regex")
    })
}

/// Parse a triplet cell: either `a,b,c` or a list literal `['a,b,c', "d,e,f"]`
pub fn parse_triplets(cell: &str) -> Result<Vec<Triplet>, DataError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(Vec::new());
    }
    if !cell.starts_with('[') {
        return Ok(vec![Triplet::parse(cell)?]);
    }

    if !cell.ends_with(']') {
        return Err(DataError::MalformedTripletList(cell.to_string()));
    }

    let regex = quoted_string_regex();
    // Anything outside the quoted items must be list punctuation
    let leftover = regex.replace_all(&cell[1..cell.len() - 1], "");
    if leftover.chars().any(|c| c != ',' && !c.is_whitespace()) {
        return Err(DataError::MalformedTripletList(cell.to_string()));
    }

    regex
        .captures_iter(cell)
        .map(|caps| {
            let item = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("");
            Triplet::parse(item)
        })
        .collect()
}

/// Loads the model results table into resolved `Example`s
pub struct ResultsParser {
    disambiguator: TripletDisambiguator,
}

impl ResultsParser {
    pub fn new(disambiguator: TripletDisambiguator) -> Self {
        Self { disambiguator }
    }

    pub fn disambiguator(&self) -> &TripletDisambiguator {
        &self.disambiguator
    }

    /// Parse a CSV file (plain or gzipped)
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Example>> {
        let path = path.as_ref();
        let reader = source::open_text(path)?;
        self.parse_reader(reader)
            .with_context(|| format!("Failed to load model results from {}", path.display()))
    }

    /// Parse CSV from any reader; rows come back sorted by id
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<Example>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut examples = Vec::new();
        let mut dropped = 0usize;

        for (row_idx, row) in csv_reader.deserialize::<RawRow>().enumerate() {
            let row = row.with_context(|| format!("Malformed results row {}", row_idx + 1))?;
            let id = row.id;
            match self.to_example(row).with_context(|| format!("Invalid results row with id {}", id))? {
                Some(example) => examples.push(example),
                None => dropped += 1,
            }
        }

        examples.sort_by_key(|example| example.id);
        log::info!("Loaded {} examples ({} rows dropped as empty)", examples.len(), dropped);
        Ok(examples)
    }

    /// Clean one row; `None` when it has no usable sentence or triplets
    fn to_example(&self, row: RawRow) -> Result<Option<Example>, DataError> {
        let sentence = normalize_sentence(row.sentence.as_deref().unwrap_or(""));
        let negated_sentence = normalize_sentence(row.neg_sentence.as_deref().unwrap_or(""));
        let positive_candidates = parse_triplets(row.pos_triplet.as_deref().unwrap_or(""))?;
        let negative_candidates = parse_triplets(row.neg_triplet.as_deref().unwrap_or(""))?;

        if sentence.is_empty()
            || negated_sentence.is_empty()
            || positive_candidates.is_empty()
            || negative_candidates.is_empty()
        {
            return Ok(None);
        }

        let negation_type = NegationType::from_code(row.neg_type.as_deref().unwrap_or(""))?;

        let positive_triplet = self.disambiguator.resolve(&positive_candidates, &sentence);
        let negative_triplet = self.disambiguator.resolve(&negative_candidates, &negated_sentence);
        let (Some(positive_triplet), Some(negative_triplet)) = (positive_triplet, negative_triplet) else {
            return Ok(None);
        };

        Ok(Some(Example {
            id: row.id,
            positive_triplet: positive_triplet.clone(),
            negative_triplet: negative_triplet.clone(),
            sentence,
            negated_sentence,
            negation_type,
            model_prediction: row.prediction.as_deref() == Some(POSITIVE_PREDICTION),
            model_score_gap: row.clip_score_diff,
        }))
    }
}

impl Default for ResultsParser {
    fn default() -> Self {
        Self::new(TripletDisambiguator::default())
    }
}
