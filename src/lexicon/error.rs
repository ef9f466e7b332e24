use thiserror::Error;

/// Errors that abort lexicon loading
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("{source_name}:{line}: malformed line: {reason}")]
    MalformedLine {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("{source_name}:{line}: verb list appears before any class header")]
    ContentBeforeHeader { source_name: String, line: usize },

    #[error("Levin class id {0} has no broad semantic group name")]
    UnknownLevinGroup(u32),

    #[error("Invalid Levin group mapping: {0}")]
    InvalidGroupMapping(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LexiconError {
    pub(crate) fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        LexiconError::MalformedLine {
            source_name: source_name.to_string(),
            line,
            reason: reason.into(),
        }
    }
}
