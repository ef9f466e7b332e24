//! LIWC word -> category multimap with `*` prefix wildcards.

use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;
use std::path::Path;

use anyhow::Result;

use crate::data::source;
use crate::lexicon::error::LexiconError;

const WILDCARD: char = '*';

#[derive(Debug, Clone)]
struct LiwcEntry {
    key: String,
    categories: Vec<String>,
}

/// LIWC dictionary.
///
/// Entries keep file order; a lookup returns categories of every matching
/// entry in that order, exact and wildcard matches interleaved as in the file.
#[derive(Debug, Clone, Default)]
pub struct LiwcLexicon {
    entries: Vec<LiwcEntry>,
    exact: HashMap<String, usize>,
    /// (prefix, entry index) for keys ending in `*`
    wildcards: Vec<(String, usize)>,
    categories: BTreeSet<String>,
}

impl LiwcLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str, category: &str) {
        let idx = match self.exact.get(word) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(LiwcEntry {
                    key: word.to_string(),
                    categories: Vec::new(),
                });
                self.exact.insert(word.to_string(), idx);
                if let Some(prefix) = word.strip_suffix(WILDCARD) {
                    self.wildcards.push((prefix.to_string(), idx));
                }
                idx
            }
        };
        self.entries[idx].categories.push(category.to_string());
        self.categories.insert(category.to_string());
    }

    /// Parse `word,category` lines. Every line, blank ones included, must
    /// carry exactly two fields.
    pub fn parse<R: BufRead>(reader: R, source_name: &str) -> Result<Self, LexiconError> {
        let mut lexicon = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                return Err(LexiconError::malformed(source_name, idx + 1, "blank line"));
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match fields.as_slice() {
                [word, category] => lexicon.insert(word, category),
                _ => {
                    return Err(LexiconError::malformed(
                        source_name,
                        idx + 1,
                        format!("expected 2 comma-separated fields, found {}", fields.len()),
                    ))
                }
            }
        }
        Ok(lexicon)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lexicon = Self::parse(source::open_text(path)?, &path.display().to_string())?;
        log::info!(
            "Loaded {} LIWC entries across {} categories",
            lexicon.entries.len(),
            lexicon.categories.len()
        );
        Ok(lexicon)
    }

    /// Categories of `word`: exact key match or wildcard prefix match
    pub fn categories_of(&self, word: &str) -> Vec<String> {
        let mut matched: Vec<usize> = self
            .wildcards
            .iter()
            .filter(|(prefix, _)| word.starts_with(prefix.as_str()))
            .map(|&(_, idx)| idx)
            .collect();
        if let Some(&idx) = self.exact.get(word) {
            if !matched.contains(&idx) {
                matched.push(idx);
            }
        }
        matched.sort_unstable();

        matched
            .into_iter()
            .flat_map(|idx| self.entries[idx].categories.iter().cloned())
            .collect()
    }

    /// Every distinct category in the dictionary
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
