//! One-hot expansion of low-cardinality columns

use crate::error::{DonorcastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Categories learned for one encoded column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnMapping {
    column: String,
    /// Category keys in output order
    categories: Vec<String>,
}

/// One-hot encoder over a DataFrame.
///
/// Candidate columns are those with more than one and fewer than
/// `max_unique` distinct values, excluding the label column. Each category
/// becomes a `<column>_<category>` 0/1 column appended in category order;
/// the source column is dropped. Numeric source columns order their
/// categories numerically, string columns lexicographically, so the output
/// layout reproduces the training-time dummy ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DummyEncoder {
    max_unique: usize,
    label_column: String,
    mappings: Vec<ColumnMapping>,
    is_fitted: bool,
}

impl DummyEncoder {
    /// Create an encoder with the given cardinality bound
    pub fn new(max_unique: usize) -> Self {
        Self {
            max_unique,
            label_column: "income".to_string(),
            mappings: Vec::new(),
            is_fitted: false,
        }
    }

    /// Set the label column excluded from encoding
    pub fn with_label_column(mut self, label: impl Into<String>) -> Self {
        self.label_column = label.into();
        self
    }

    /// Learn category mappings from the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.mappings.clear();

        for column in df.get_columns() {
            let name = column.name().to_string();
            if name == self.label_column {
                continue;
            }

            let n_unique = column.n_unique()?;
            if n_unique <= 1 || n_unique >= self.max_unique {
                continue;
            }

            let categories = category_keys(column.as_materialized_series())?;
            debug!(column = %name, n_categories = categories.len(), "encoding column");
            self.mappings.push(ColumnMapping {
                column: name,
                categories,
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Expand encoded columns into 0/1 indicator columns
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(DonorcastError::ModelNotFitted);
        }

        let mut result = df.clone();

        for mapping in &self.mappings {
            let column = result
                .column(&mapping.column)
                .map_err(|_| DonorcastError::FeatureNotFound(mapping.column.clone()))?;
            let keys = row_keys(column.as_materialized_series())?;

            for category in &mapping.categories {
                let name = format!("{}_{}", mapping.column, category);
                let values: Vec<i32> = keys
                    .iter()
                    .map(|k| match k {
                        Some(v) if v == category => 1,
                        _ => 0,
                    })
                    .collect();

                let series = Series::new(name.into(), values);
                result = result.with_column(series)?.clone();
            }

            result = result.drop(&mapping.column)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Names of the columns selected for encoding
    pub fn encoded_columns(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.column.as_str()).collect()
    }

    /// Save the fitted encoder to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a fitted encoder from a file
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let encoder: Self = serde_json::from_str(&json)?;
        Ok(encoder)
    }
}

impl Default for DummyEncoder {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_UNIQUE)
    }
}

/// Harmonize an encoded frame to the training feature set: drop columns the
/// training data never had, add zero-filled columns for training features
/// the frame is missing. The label column is left untouched.
pub fn align_to_training(
    train_columns: &[String],
    df: &DataFrame,
    label_column: &str,
) -> Result<DataFrame> {
    let mut result = df.clone();
    let height = df.height();

    let existing: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for name in &existing {
        if name != label_column && !train_columns.iter().any(|c| c == name) {
            debug!(column = %name, "dropping column absent from training data");
            result = result.drop(name)?;
        }
    }

    for name in train_columns {
        if name != label_column && !existing.iter().any(|c| c == name) {
            debug!(column = %name, "adding zero column for missing training feature");
            let series = Series::new(name.as_str().into(), vec![0i32; height]);
            result = result.with_column(series)?.clone();
        }
    }

    Ok(result)
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

/// Distinct category keys of a series, in dummy-column order
fn category_keys(series: &Series) -> Result<Vec<String>> {
    let unique = series.unique()?;

    if is_numeric_dtype(unique.dtype()) {
        let ca = unique.cast(&DataType::Float64)?;
        let mut values: Vec<f64> = ca.f64()?.into_iter().flatten().collect();
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(values.iter().map(|v| format_numeric_key(*v)).collect())
    } else {
        let ca = unique.cast(&DataType::String)?;
        let mut values: Vec<String> = ca
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        values.sort();
        Ok(values)
    }
}

/// Per-row category keys of a series, null-preserving
fn row_keys(series: &Series) -> Result<Vec<Option<String>>> {
    if is_numeric_dtype(series.dtype()) {
        let ca = series.cast(&DataType::Float64)?;
        Ok(ca
            .f64()?
            .into_iter()
            .map(|v| v.map(format_numeric_key))
            .collect())
    } else {
        let ca = series.cast(&DataType::String)?;
        Ok(ca
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect())
    }
}

/// Canonical key for a numeric category: integers print without a decimal
fn format_numeric_key(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "age" => &[25i64, 30, 35, 40, 45],
            "sex" => &["Male", "Female", "Male", "Male", "Female"],
            "grade" => &[3i64, 1, 2, 3, 1],
            "income" => &["<=50K", ">50K", "<=50K", ">50K", "<=50K"],
        )
        .unwrap()
    }

    #[test]
    fn test_candidate_selection() {
        let df = sample_df();
        let mut encoder = DummyEncoder::new(4);
        encoder.fit(&df).unwrap();

        // age has 5 uniques (>= 4), income is the label; sex and grade remain
        let cols = encoder.encoded_columns();
        assert_eq!(cols, vec!["sex", "grade"]);
    }

    #[test]
    fn test_transform_expands_and_drops() {
        let df = sample_df();
        let mut encoder = DummyEncoder::new(4);
        let result = encoder.fit_transform(&df).unwrap();

        assert!(result.column("sex").is_err());
        assert!(result.column("sex_Male").is_ok());
        assert!(result.column("sex_Female").is_ok());
        assert!(result.column("grade_1").is_ok());
        assert!(result.column("grade_3").is_ok());
        // age untouched
        assert!(result.column("age").is_ok());

        let male = result.column("sex_Male").unwrap().i32().unwrap();
        let values: Vec<i32> = male.into_iter().flatten().collect();
        assert_eq!(values, vec![1, 0, 1, 1, 0]);
    }

    #[test]
    fn test_numeric_categories_sorted_numerically() {
        let df = df!(
            "level" => &[11i64, 2, 11, 9, 2],
            "income" => &["<=50K", ">50K", "<=50K", ">50K", "<=50K"],
        )
        .unwrap();

        let mut encoder = DummyEncoder::new(10);
        let result = encoder.fit_transform(&df).unwrap();

        let names: Vec<String> = result
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let i2 = names.iter().position(|n| n == "level_2").unwrap();
        let i9 = names.iter().position(|n| n == "level_9").unwrap();
        let i11 = names.iter().position(|n| n == "level_11").unwrap();
        assert!(i2 < i9 && i9 < i11);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let encoder = DummyEncoder::default();
        let df = sample_df();
        assert!(matches!(
            encoder.transform(&df),
            Err(DonorcastError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_unseen_category_yields_all_zeros() {
        let train = df!(
            "sex" => &["Male", "Female", "Male"],
            "income" => &["<=50K", ">50K", "<=50K"],
        )
        .unwrap();
        let test = df!(
            "sex" => &["Other"],
            "income" => &["<=50K"],
        )
        .unwrap();

        let mut encoder = DummyEncoder::new(5);
        encoder.fit(&train).unwrap();
        let result = encoder.transform(&test).unwrap();

        let male = result.column("sex_Male").unwrap().i32().unwrap();
        let female = result.column("sex_Female").unwrap().i32().unwrap();
        assert_eq!(male.get(0), Some(0));
        assert_eq!(female.get(0), Some(0));
    }

    #[test]
    fn test_align_to_training() {
        let train_columns = vec![
            "age".to_string(),
            "sex_Male".to_string(),
            "sex_Female".to_string(),
        ];
        let test = df!(
            "age" => &[50i64, 60],
            "sex_Male" => &[1i32, 0],
            "sex_Other" => &[0i32, 1],
            "income" => &[0i64, 1],
        )
        .unwrap();

        let result = align_to_training(&train_columns, &test, "income").unwrap();

        assert!(result.column("sex_Other").is_err());
        let female = result.column("sex_Female").unwrap().i32().unwrap();
        assert_eq!(female.get(0), Some(0));
        assert_eq!(female.get(1), Some(0));
        // Label preserved
        assert!(result.column("income").is_ok());
    }

    #[test]
    fn test_encoder_round_trip() {
        let df = sample_df();
        let mut encoder = DummyEncoder::new(4);
        encoder.fit(&df).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        encoder.save(path).unwrap();

        let loaded = DummyEncoder::load(path).unwrap();
        assert_eq!(loaded.encoded_columns(), encoder.encoded_columns());

        let a = encoder.transform(&df).unwrap();
        let b = loaded.transform(&df).unwrap();
        assert_eq!(a.get_column_names(), b.get_column_names());
    }
}
