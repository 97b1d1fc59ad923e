//! CSV loading and prediction export

use crate::error::{DonorcastError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::warn;

/// Loader for the census CSV files
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set the number of rows used for dtype inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a headered CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            DonorcastError::DataError(format!("{}: {}", path.display(), e))
        })?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file);

        Ok(reader.finish()?)
    }

    /// Load the train/test split and stack the rows into one frame
    pub fn load_split(&self, train_path: &Path, test_path: &Path) -> Result<DataFrame> {
        let train = self.load_csv(train_path)?;
        let test = self.load_csv(test_path)?;
        Ok(train.vstack(&test)?)
    }
}

/// Replace the string income label with 1 (`>50K`) / 0 (`<=50K`).
/// A frame whose label is already numeric passes through unchanged.
pub fn binarize_income(df: &DataFrame, label_column: &str) -> Result<DataFrame> {
    let column = df
        .column(label_column)
        .map_err(|_| DonorcastError::FeatureNotFound(label_column.to_string()))?;

    if column.dtype() != &DataType::String {
        return Ok(df.clone());
    }

    let values: Vec<i64> = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| match v {
            Some(s) if s.trim() == ">50K" => 1,
            _ => 0,
        })
        .collect();

    let mut result = df.clone();
    let series = Series::new(label_column.into(), values);
    result = result.with_column(series)?.clone();
    Ok(result)
}

/// Write actual rows plus an `income_pred` column to a CSV file.
///
/// An existing file is left untouched with a warning, so repeated runs do
/// not clobber earlier results.
pub fn save_predictions(df: &DataFrame, predictions: &[i64], path: &Path) -> Result<()> {
    if path.exists() {
        warn!(path = %path.display(), "results file already exists, not overwriting");
        return Ok(());
    }

    if df.height() != predictions.len() {
        return Err(DonorcastError::ShapeError {
            expected: format!("{} predictions", df.height()),
            actual: format!("{} predictions", predictions.len()),
        });
    }

    let mut result = df.clone();
    let series = Series::new("income_pred".into(), predictions.to_vec());
    result = result.with_column(series)?.clone();

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut result)?;
    Ok(())
}
