//! Per-example feature extraction and numeric encoding.

pub mod column;
pub mod encoder;
pub mod extractor;
pub mod matrix;
pub mod record;

pub use column::{ColumnFamily, ColumnName};
pub use encoder::{CategoryBinarizer, EncoderOptions, FeatureEncoder, FittedEncoder, ScalarScaler};
pub use extractor::{tally_labels, FeatureError, FeatureExtractor};
pub use matrix::{Column, ColumnKind, EncodedFeatureMatrix};
pub use record::{FeatureRecord, FeatureTable, FeatureValue, LabelTally, RawFeature};
