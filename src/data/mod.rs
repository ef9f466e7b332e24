pub mod example;
pub mod parser;
pub mod source;

pub use example::{DataError, Example, NegationType, Triplet};
pub use parser::{normalize_sentence, parse_triplets, ResultsParser};
