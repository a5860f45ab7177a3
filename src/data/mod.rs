//! Dataset construction
//!
//! - [`FeatureSchema`] and [`FeatureVector`] for named descriptor rows
//! - [`FeatureExtractor`] for turning identifiers into descriptors
//! - [`Dataset`] for schema-checked labeled data
//! - [`train_test_split`] for seeded partitioning

mod dataset;
mod features;
mod split;

pub use dataset::{Dataset, SkippedRecord};
pub use features::{
    DescriptorTable, FeatureExtractor, FeatureSchema, FeatureVector, SOLUBILITY_DESCRIPTORS,
};
pub use split::{train_test_split, Split};
