use super::extractor::FeatureMap;
use crate::utils::stats;
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;

/// Per-feature summary vectors keyed `"{feature}_{method}"`.
pub type AggregateMap = BTreeMap<String, Array1<f32>>;

/// Summary vectors grouped as `feature -> method -> values`.
pub type GroupedAggregates = BTreeMap<String, BTreeMap<String, Array1<f32>>>;

/// Statistic used to collapse the frame axis of a feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationMethod {
    Mean,
    /// Population standard deviation.
    Std,
    Min,
    Max,
    Median,
    /// Bias-corrected skewness.
    Skewness,
    /// Bias-corrected excess kurtosis.
    Kurtosis,
    /// `max - min`.
    Range,
    Quantile25,
    Quantile75,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 10] = [
        AggregationMethod::Mean,
        AggregationMethod::Std,
        AggregationMethod::Min,
        AggregationMethod::Max,
        AggregationMethod::Median,
        AggregationMethod::Skewness,
        AggregationMethod::Kurtosis,
        AggregationMethod::Range,
        AggregationMethod::Quantile25,
        AggregationMethod::Quantile75,
    ];

    /// Methods applied by [`FeatureAggregator::aggregate_default`].
    pub const DEFAULT: [AggregationMethod; 6] = [
        AggregationMethod::Mean,
        AggregationMethod::Std,
        AggregationMethod::Min,
        AggregationMethod::Max,
        AggregationMethod::Median,
        AggregationMethod::Range,
    ];

    pub const SUPPORTED: &'static [&'static str] = &[
        "mean",
        "std",
        "min",
        "max",
        "median",
        "skewness",
        "kurtosis",
        "range",
        "quantile_25",
        "quantile_75",
    ];

    pub fn parse(name: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| crate::Error::Unsupported {
                kind: "aggregation method",
                got: name.to_string(),
                supported: Self::SUPPORTED,
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregationMethod::Mean => "mean",
            AggregationMethod::Std => "std",
            AggregationMethod::Min => "min",
            AggregationMethod::Max => "max",
            AggregationMethod::Median => "median",
            AggregationMethod::Skewness => "skewness",
            AggregationMethod::Kurtosis => "kurtosis",
            AggregationMethod::Range => "range",
            AggregationMethod::Quantile25 => "quantile_25",
            AggregationMethod::Quantile75 => "quantile_75",
        }
    }

    /// Apply the statistic to one column of frame values.
    pub fn apply(self, x: &[f32]) -> f32 {
        match self {
            AggregationMethod::Mean => stats::mean(x),
            AggregationMethod::Std => stats::std(x),
            AggregationMethod::Min => stats::min(x),
            AggregationMethod::Max => stats::max(x),
            AggregationMethod::Median => stats::median(x),
            AggregationMethod::Skewness => stats::skewness(x),
            AggregationMethod::Kurtosis => stats::kurtosis(x),
            AggregationMethod::Range => stats::max(x) - stats::min(x),
            AggregationMethod::Quantile25 => stats::quantile(x, 0.25),
            AggregationMethod::Quantile75 => stats::quantile(x, 0.75),
        }
    }
}

impl std::str::FromStr for AggregationMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        AggregationMethod::parse(s)
    }
}

/// Collapses frame-level feature matrices into fixed-length summaries.
///
/// Statistics are taken along the frame axis (axis 0), so an
/// `(n_frames, k)` matrix yields `k` values per method.
///
/// # Example
/// ```
/// use audiofeatures::pipeline::{FeatureAggregator, FeatureMap};
/// use ndarray::array;
///
/// let mut features = FeatureMap::new();
/// features.insert("rms".to_string(), array![[1.0f32], [3.0]]);
/// let summary = FeatureAggregator::new().aggregate(&features, &["mean", "range"]).unwrap();
/// assert_eq!(summary["rms_mean"][0], 2.0);
/// assert_eq!(summary["rms_range"][0], 2.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAggregator;

impl FeatureAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate every feature with the named methods.
    ///
    /// All method names are checked before any statistic is computed.
    pub fn aggregate(&self, features: &FeatureMap, methods: &[&str]) -> crate::Result<AggregateMap> {
        let methods = methods
            .iter()
            .map(|name| AggregationMethod::parse(name))
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(self.aggregate_methods(features, &methods))
    }

    /// Aggregate every feature with the given methods.
    pub fn aggregate_methods(
        &self,
        features: &FeatureMap,
        methods: &[AggregationMethod],
    ) -> AggregateMap {
        let mut out = AggregateMap::new();
        for (name, matrix) in features {
            let columns = columns_of(name, matrix);
            for &method in methods {
                let values = columns.iter().map(|col| method.apply(col)).collect::<Array1<f32>>();
                out.insert(format!("{name}_{}", method.as_str()), values);
            }
        }
        out
    }

    /// Mean, std, min, max, median and range of every feature, grouped by feature.
    pub fn aggregate_default(&self, features: &FeatureMap) -> GroupedAggregates {
        let mut grouped = GroupedAggregates::new();
        for (name, matrix) in features {
            let columns = columns_of(name, matrix);
            let stats = grouped.entry(name.clone()).or_default();
            for method in AggregationMethod::DEFAULT {
                let values = columns.iter().map(|col| method.apply(col)).collect();
                stats.insert(method.as_str().to_string(), values);
            }
        }
        grouped
    }
}

fn columns_of(name: &str, matrix: &Array2<f32>) -> Vec<Vec<f32>> {
    if matrix.nrows() == 0 {
        log::warn!("feature '{name}' has no frames; its statistics are NaN");
    }
    matrix.axis_iter(Axis(1)).map(|col| col.to_vec()).collect()
}
