//! Name-driven feature extraction and aggregation.
//!
//! [`FeatureExtractor`] maps feature names onto the extractors in
//! [`crate::feature`] with one shared configuration; [`FeatureAggregator`]
//! collapses the resulting matrices into per-recording summaries.

mod aggregator;
mod extractor;
mod source;

pub use aggregator::{AggregateMap, AggregationMethod, FeatureAggregator, GroupedAggregates};
pub use extractor::{ExtractorConfig, FeatureExtractor, FeatureKind, FeatureMap};
pub use source::SignalSource;
