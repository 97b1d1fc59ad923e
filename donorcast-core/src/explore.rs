//! Class-split feature distribution summaries
//!
//! For each column, rows are split into the `>50K` and `<=50K` income
//! classes and summarized: per-category counts for low-cardinality columns
//! (native-country always counts as categorical despite its cardinality),
//! fixed-width histogram bins for continuous ones.

use crate::error::{DonorcastError, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings for the distribution sweep
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    /// Unique-count bound below which a column is summarized by category
    pub max_unique: usize,
    /// Number of histogram bins for continuous columns
    pub bins: usize,
    /// Label column used for the class split
    pub label_column: String,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_unique: 20,
            bins: 20,
            label_column: "income".to_string(),
        }
    }
}

/// One histogram bin
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
}

/// Distribution of one column for one class
#[derive(Debug, Clone, Serialize)]
pub enum Distribution {
    /// Category -> count, sorted by category
    Categorical(Vec<(String, u32)>),
    /// Equal-width bins over the observed range
    Histogram(Vec<HistogramBin>),
}

/// Class-split summary of one column
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub feature: String,
    pub high_donors: Distribution,
    pub regular_donors: Distribution,
}

/// Summarize every non-label column, split by income class
pub fn summarize_features(df: &DataFrame, config: &ExploreConfig) -> Result<Vec<FeatureSummary>> {
    let (high, regular) = split_by_income(df, &config.label_column)?;

    let features: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .filter(|name| name != &config.label_column)
        .collect();

    features
        .par_iter()
        .map(|feature| summarize_feature(df, &high, &regular, feature, config))
        .collect()
}

/// Summarize a single column, split by income class
pub fn summarize_feature(
    df: &DataFrame,
    high: &DataFrame,
    regular: &DataFrame,
    feature: &str,
    config: &ExploreConfig,
) -> Result<FeatureSummary> {
    let column = df
        .column(feature)
        .map_err(|_| DonorcastError::FeatureNotFound(feature.to_string()))?;

    let n_unique = column.n_unique()?;
    // native-country is categorical despite its cardinality
    let categorical = !is_numeric_dtype(column.dtype())
        || n_unique <= config.max_unique
        || feature == "native-country";

    let (high_dist, regular_dist) = if categorical {
        (
            category_counts(high, feature)?,
            category_counts(regular, feature)?,
        )
    } else {
        // Shared bin edges so the two classes are comparable
        let (min, max) = column_range(df, feature)?;
        (
            histogram(high, feature, min, max, config.bins)?,
            histogram(regular, feature, min, max, config.bins)?,
        )
    };

    Ok(FeatureSummary {
        feature: feature.to_string(),
        high_donors: high_dist,
        regular_donors: regular_dist,
    })
}

/// Split rows into (`>50K`, `<=50K`) frames. Works on the raw string label
/// as well as the binarized 1/0 form.
pub fn split_by_income(df: &DataFrame, label_column: &str) -> Result<(DataFrame, DataFrame)> {
    let column = df
        .column(label_column)
        .map_err(|_| DonorcastError::FeatureNotFound(label_column.to_string()))?;
    let series = column.as_materialized_series();

    let high_mask: Vec<bool> = if series.dtype() == &DataType::String {
        series
            .str()?
            .into_iter()
            .map(|v| matches!(v, Some(s) if s.trim() == ">50K"))
            .collect()
    } else {
        let ca = series.cast(&DataType::Int64)?;
        ca.i64()?
            .into_iter()
            .map(|v| matches!(v, Some(1)))
            .collect()
    };

    let regular_mask: Vec<bool> = high_mask.iter().map(|b| !b).collect();
    let high = df.filter(&BooleanChunked::from_slice("mask".into(), &high_mask))?;
    let regular = df.filter(&BooleanChunked::from_slice("mask".into(), &regular_mask))?;
    Ok((high, regular))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn category_counts(df: &DataFrame, feature: &str) -> Result<Distribution> {
    let column = df
        .column(feature)
        .map_err(|_| DonorcastError::FeatureNotFound(feature.to_string()))?;
    let ca = column.as_materialized_series().cast(&DataType::String)?;

    let mut counts: HashMap<String, u32> = HashMap::new();
    for value in ca.str()?.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, u32)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Distribution::Categorical(sorted))
}

fn column_range(df: &DataFrame, feature: &str) -> Result<(f64, f64)> {
    let values = numeric_values(df, feature)?;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Err(DonorcastError::DataError(format!(
            "column '{}' has no finite values to bin",
            feature
        )));
    }
    Ok((min, max))
}

fn histogram(
    df: &DataFrame,
    feature: &str,
    min: f64,
    max: f64,
    bins: usize,
) -> Result<Distribution> {
    let values = numeric_values(df, feature)?;
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0
    };

    let mut counts = vec![0u32; bins];
    for v in values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }

    let bins: Vec<HistogramBin> = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
        })
        .collect();

    Ok(Distribution::Histogram(bins))
}

fn numeric_values(df: &DataFrame, feature: &str) -> Result<Vec<f64>> {
    let column = df
        .column(feature)
        .map_err(|_| DonorcastError::FeatureNotFound(feature.to_string()))?;
    let ca = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(ca.f64()?.into_iter().flatten().collect())
}

/// Write one summary as `<dir>/<feature>.csv` with class/value/count rows.
/// Returns the path written.
pub fn write_summary_csv(summary: &FeatureSummary, dir: &Path) -> Result<PathBuf> {
    use std::io::Write;

    // Slashes in feature names would escape the output directory
    let file_name = format!("{}.csv", summary.feature.replace('/', "-"));
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path)?;

    writeln!(file, "class,value,count")?;
    for (class, dist) in [
        (">50K", &summary.high_donors),
        ("<=50K", &summary.regular_donors),
    ] {
        match dist {
            Distribution::Categorical(counts) => {
                for (category, count) in counts {
                    writeln!(file, "{},{},{}", class, escape_csv(category), count)?;
                }
            }
            Distribution::Histogram(bins) => {
                for bin in bins {
                    writeln!(
                        file,
                        "{},{:.2}..{:.2},{}",
                        class, bin.lower, bin.upper, bin.count
                    )?;
                }
            }
        }
    }

    Ok(path)
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "age" => &[25i64, 30, 35, 40, 45, 50],
            "sex" => &["Male", "Female", "Male", "Male", "Female", "Male"],
            "income" => &[">50K", "<=50K", ">50K", "<=50K", "<=50K", ">50K"],
        )
        .unwrap()
    }

    #[test]
    fn test_split_by_income_strings() {
        let df = sample_df();
        let (high, regular) = split_by_income(&df, "income").unwrap();
        assert_eq!(high.height(), 3);
        assert_eq!(regular.height(), 3);
    }

    #[test]
    fn test_split_by_income_binarized() {
        let df = df!(
            "age" => &[25i64, 30, 35],
            "income" => &[1i64, 0, 1],
        )
        .unwrap();
        let (high, regular) = split_by_income(&df, "income").unwrap();
        assert_eq!(high.height(), 2);
        assert_eq!(regular.height(), 1);
    }

    #[test]
    fn test_categorical_summary() {
        let df = sample_df();
        let config = ExploreConfig::default();
        let summaries = summarize_features(&df, &config).unwrap();

        let sex = summaries.iter().find(|s| s.feature == "sex").unwrap();
        match &sex.high_donors {
            Distribution::Categorical(counts) => {
                // High-donor rows: Male, Male, Male
                assert_eq!(counts, &vec![("Male".to_string(), 3)]);
            }
            _ => panic!("sex should be categorical"),
        }
    }

    #[test]
    fn test_histogram_summary() {
        let df = sample_df();
        let config = ExploreConfig {
            max_unique: 3,
            bins: 5,
            ..Default::default()
        };
        let summaries = summarize_features(&df, &config).unwrap();

        let age = summaries.iter().find(|s| s.feature == "age").unwrap();
        match &age.regular_donors {
            Distribution::Histogram(bins) => {
                assert_eq!(bins.len(), 5);
                let total: u32 = bins.iter().map(|b| b.count).sum();
                assert_eq!(total, 3);
            }
            _ => panic!("age should be continuous at max_unique=3"),
        }
    }

    #[test]
    fn test_label_excluded() {
        let df = sample_df();
        let summaries = summarize_features(&df, &ExploreConfig::default()).unwrap();
        assert!(summaries.iter().all(|s| s.feature != "income"));
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_write_summary_csv() {
        let df = sample_df();
        let summaries = summarize_features(&df, &ExploreConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = write_summary_csv(&summaries[0], dir.path()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("class,value,count"));
        assert!(content.contains(">50K"));
    }
}
