//! Levin verb classes.
//!
//! The class file is semi-structured: a line starting with a digit is a class
//! header (`9.1 Put Verbs`), the indented lines after it list member verbs, and
//! a blank line closes the class. A second JSON file names the broad semantic
//! group for each leading class id.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::source;
use crate::lexicon::error::LexiconError;

/// Class ids up to this value are alternation classes, not semantic ones
pub const ALTERNATION_MAX_ID: u32 = 8;

/// Member lists containing this marker are placeholders and get discarded
pub const PLACEHOLDER_MARKER: &str = "-*-";

/// One fine-grained Levin class
#[derive(Debug, Clone)]
pub struct LevinClass {
    /// Whitespace-normalised header line, e.g. `9.1 Put Verbs`
    pub header: String,
    /// Leading integer of the header (`9` for `9.1`)
    pub id: u32,
    pub verbs: Vec<String>,
    members: HashSet<String>,
}

impl LevinClass {
    pub fn new(header: impl Into<String>, id: u32, verbs: Vec<String>) -> Self {
        let members = verbs.iter().cloned().collect();
        Self {
            header: header.into(),
            id,
            verbs,
            members,
        }
    }

    /// Exact, case-sensitive membership test
    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(word)
    }

    pub fn is_alternation(&self) -> bool {
        self.id <= ALTERNATION_MAX_ID
    }
}

/// Leading integer id of a class header
fn parse_class_id(header: &str) -> Option<u32> {
    header
        .split(' ')
        .next()?
        .split('.')
        .next()?
        .parse()
        .ok()
}

/// Parse the class file into class blocks, in file order.
///
/// A blank line closes a block once it has verbs; blank lines between a
/// header and its verbs are skipped. A header repeated later in the file
/// yields one block per occurrence; [`LevinLexicon::from_classes`] decides
/// how repeats combine.
pub fn parse_classes<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<LevinClass>, LexiconError> {
    let mut classes: Vec<LevinClass> = Vec::new();
    let mut pending: Option<(String, u32)> = None;
    let mut content = String::new();

    let mut flush = |pending: &mut Option<(String, u32)>, content: &mut String| {
        if let Some((header, id)) = pending.take() {
            if content.contains(PLACEHOLDER_MARKER) {
                log::debug!("Discarding placeholder Levin class {}", header);
            } else {
                let verbs: Vec<String> = content.split_whitespace().map(str::to_lowercase).collect();
                classes.push(LevinClass::new(header, id, verbs));
            }
        }
        content.clear();
    };

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let stripped = line.trim_start();

        if stripped.chars().next().is_some_and(char::is_numeric) {
            flush(&mut pending, &mut content);
            let header = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
            let id = parse_class_id(&header).ok_or_else(|| {
                LexiconError::malformed(source_name, line_no, format!("class header without integer id: {:?}", header))
            })?;
            pending = Some((header, id));
        } else if !stripped.is_empty() {
            if pending.is_none() {
                return Err(LexiconError::ContentBeforeHeader {
                    source_name: source_name.to_string(),
                    line: line_no,
                });
            }
            content.push_str(stripped.trim_end());
            content.push(' ');
        } else if !content.is_empty() {
            flush(&mut pending, &mut content);
        }
    }
    flush(&mut pending, &mut content);

    Ok(classes)
}

/// Parse the `{"9": "Verbs of Putting", ...}` group mapping
pub fn parse_group_names(json: &str) -> Result<HashMap<u32, String>, LexiconError> {
    let raw: HashMap<String, String> =
        serde_json::from_str(json).map_err(|e| LexiconError::InvalidGroupMapping(e.to_string()))?;
    raw.into_iter()
        .map(|(key, name)| {
            key.trim()
                .parse::<u32>()
                .map(|id| (id, name))
                .map_err(|_| LexiconError::InvalidGroupMapping(format!("non-integer class id {:?}", key)))
        })
        .collect()
}

/// All Levin views derived from the class file and the group mapping
#[derive(Debug, Clone)]
pub struct LevinLexicon {
    /// Alternation and semantic classes together, in file order
    classes: Vec<LevinClass>,
    /// Verbs of all classes sharing a leading id, concatenated
    compressed: BTreeMap<u32, Vec<String>>,
    /// Broad semantic group name -> union of member verbs
    semantic_broad: BTreeMap<String, BTreeSet<String>>,
}

impl LevinLexicon {
    /// Build every view from parsed class blocks.
    ///
    /// The compressed view concatenates every block, repeats included. For
    /// the class list a repeated header keeps its first position and its
    /// last verb list.
    pub fn from_classes(blocks: Vec<LevinClass>, group_names: &HashMap<u32, String>) -> Result<Self, LexiconError> {
        let mut compressed: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        let mut semantic_broad: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        let mut classes: Vec<LevinClass> = Vec::with_capacity(blocks.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for block in blocks {
            compressed.entry(block.id).or_default().extend(block.verbs.iter().cloned());
            match positions.get(&block.header) {
                Some(&pos) => {
                    log::debug!("Levin class {} repeated, keeping the later verb list", block.header);
                    classes[pos] = block;
                }
                None => {
                    positions.insert(block.header.clone(), classes.len());
                    classes.push(block);
                }
            }
        }

        for class in &classes {
            if !class.is_alternation() {
                let name = group_names
                    .get(&class.id)
                    .ok_or(LexiconError::UnknownLevinGroup(class.id))?;
                semantic_broad
                    .entry(name.clone())
                    .or_default()
                    .extend(class.verbs.iter().cloned());
            }
        }

        Ok(Self {
            classes,
            compressed,
            semantic_broad,
        })
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(classes_path: P, groups_path: Q) -> Result<Self> {
        let classes_path = classes_path.as_ref();
        let groups_path = groups_path.as_ref();

        let reader = source::open_text(classes_path)?;
        let classes = parse_classes(reader, &classes_path.display().to_string())?;
        let group_names = parse_group_names(&source::read_to_string(groups_path)?)
            .with_context(|| format!("Failed to read {}", groups_path.display()))?;

        let lexicon = Self::from_classes(classes, &group_names)?;
        log::info!(
            "Loaded {} Levin classes ({} alternation, {} broad semantic groups)",
            lexicon.classes.len(),
            lexicon.alternations().count(),
            lexicon.semantic_broad.len()
        );
        Ok(lexicon)
    }

    /// Every class, alternation and semantic
    pub fn classes(&self) -> &[LevinClass] {
        &self.classes
    }

    pub fn alternations(&self) -> impl Iterator<Item = &LevinClass> {
        self.classes.iter().filter(|class| class.is_alternation())
    }

    /// Fine-grained semantic classes (id above the alternation range)
    pub fn semantic_classes(&self) -> impl Iterator<Item = &LevinClass> {
        self.classes.iter().filter(|class| !class.is_alternation())
    }

    pub fn semantic_broad(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.semantic_broad
    }

    pub fn compressed(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.compressed
    }

    /// Headers of every class listing `word` as a member
    pub fn classes_of(&self, word: &str) -> Vec<String> {
        self.classes
            .iter()
            .filter(|class| class.contains(word))
            .map(|class| class.header.clone())
            .collect()
    }

    /// All member verbs across classes
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().flat_map(|class| class.verbs.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CLASSES: &str = "\
1.1.2.1 Causative Alternations
    break bend
    Fold

9.1 Put Verbs
    arrange immerse
    install

9.2 Verbs of Putting in a Spatial Configuration
    hang lean

10.1 Remove Verbs
    -*-

13.1 Give Verbs
    give lend
";

    fn group_names() -> HashMap<u32, String> {
        parse_group_names(r#"{"9": "Putting", "10": "Removing", "13": "Change of Possession"}"#).unwrap()
    }

    fn lexicon() -> LevinLexicon {
        let classes = parse_classes(Cursor::new(CLASSES), "fixture").unwrap();
        LevinLexicon::from_classes(classes, &group_names()).unwrap()
    }

    #[test]
    fn test_parse_classes() {
        let classes = parse_classes(Cursor::new(CLASSES), "fixture").unwrap();
        let headers: Vec<&str> = classes.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(
            headers,
            vec![
                "1.1.2.1 Causative Alternations",
                "9.1 Put Verbs",
                "9.2 Verbs of Putting in a Spatial Configuration",
                "13.1 Give Verbs",
            ]
        );
        assert_eq!(classes[0].verbs, vec!["break", "bend", "fold"]);
        assert_eq!(classes[0].id, 1);
        assert_eq!(classes[3].id, 13);
    }

    #[test]
    fn test_placeholder_class_discarded() {
        let lexicon = lexicon();
        assert!(lexicon.classes().iter().all(|c| !c.header.starts_with("10.1")));
        assert!(!lexicon.compressed().contains_key(&10));
    }

    #[test]
    fn test_compressed_merges_shared_id() {
        let lexicon = lexicon();
        assert_eq!(
            lexicon.compressed()[&9],
            vec!["arrange", "immerse", "install", "hang", "lean"]
        );
    }

    #[test]
    fn test_semantic_grouping_excludes_alternations() {
        let lexicon = lexicon();
        assert_eq!(lexicon.alternations().count(), 1);
        assert_eq!(lexicon.semantic_classes().count(), 3);

        let broad = lexicon.semantic_broad();
        assert_eq!(broad.len(), 2);
        assert!(broad["Putting"].contains("hang"));
        assert!(broad["Putting"].contains("install"));
        assert!(broad.values().all(|verbs| !verbs.contains("break")));
    }

    #[test]
    fn test_classes_of_is_exact_match() {
        let lexicon = lexicon();
        assert_eq!(lexicon.classes_of("hang"), vec!["9.2 Verbs of Putting in a Spatial Configuration"]);
        assert_eq!(lexicon.classes_of("fold"), vec!["1.1.2.1 Causative Alternations"]);
        assert!(lexicon.classes_of("Fold").is_empty());
        assert!(lexicon.classes_of("han").is_empty());
    }

    #[test]
    fn test_unknown_group_is_fatal() {
        let classes = parse_classes(Cursor::new(CLASSES), "fixture").unwrap();
        let mut names = group_names();
        names.remove(&13);
        assert!(matches!(
            LevinLexicon::from_classes(classes, &names),
            Err(LexiconError::UnknownLevinGroup(13))
        ));
    }

    #[test]
    fn test_content_before_header_is_fatal() {
        let err = parse_classes(Cursor::new("  stray verbs\n9.1 Put\n  put\n"), "fixture").unwrap_err();
        assert!(matches!(err, LexiconError::ContentBeforeHeader { line: 1, .. }));
    }

    #[test]
    fn test_blank_lines_after_header_are_padding() {
        let classes = parse_classes(
            Cursor::new("9.1 Put Verbs\n\n  arrange put place\n\n10.1 Remove Verbs\n  remove\n"),
            "levin.txt",
        )
        .unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].header, "9.1 Put Verbs");
        assert_eq!(classes[0].verbs, vec!["arrange", "put", "place"]);
        assert_eq!(classes[1].verbs, vec!["remove"]);
    }

    #[test]
    fn test_repeated_header_extends_compressed() {
        let text = "9.1 Put Verbs\n  arrange\n\n9.2 Hang Verbs\n  hang\n\n9.1 Put Verbs\n  place\n";
        let blocks = parse_classes(Cursor::new(text), "fixture").unwrap();
        assert_eq!(blocks.len(), 3);

        let lexicon = LevinLexicon::from_classes(blocks, &group_names()).unwrap();
        assert_eq!(lexicon.compressed()[&9], vec!["arrange", "hang", "place"]);

        let headers: Vec<&str> = lexicon.classes().iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["9.1 Put Verbs", "9.2 Hang Verbs"]);
        assert_eq!(lexicon.classes()[0].verbs, vec!["place"]);
        assert!(!lexicon.semantic_broad()["Putting"].contains("arrange"));
        assert!(lexicon.classes_of("arrange").is_empty());
    }

    #[test]
    fn test_bad_group_mapping() {
        assert!(parse_group_names(r#"{"nine": "Putting"}"#).is_err());
        assert!(parse_group_names("not json").is_err());
    }
}
