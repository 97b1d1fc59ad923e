//! Income model: frame extraction, fitting, metrics, persistence

use crate::error::{DonorcastError, Result};
use crate::training::{LogisticRegression, TrainingConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Validation metrics from a training run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: Option<f64>,
    pub n_samples: usize,
    pub n_features: usize,
    pub training_time_secs: f64,
}

impl ModelMetrics {
    /// Fraction of matching 0/1 labels
    pub fn compute_classification(actual: &Array1<f64>, predicted: &Array1<f64>) -> Self {
        let correct = actual
            .iter()
            .zip(predicted.iter())
            .filter(|(a, p)| (*a - *p).abs() < 0.5)
            .count();
        let accuracy = if actual.is_empty() {
            None
        } else {
            Some(correct as f64 / actual.len() as f64)
        };
        Self {
            accuracy,
            ..Default::default()
        }
    }
}

/// Fitted income classifier plus the feature ordering it was trained on.
///
/// The artifact persists both together; the recorded column order is the
/// contract a schema-aligned inference input must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeModel {
    config: TrainingConfig,
    feature_names: Vec<String>,
    model: LogisticRegression,
    metrics: Option<ModelMetrics>,
    is_fitted: bool,
}

impl IncomeModel {
    /// Create an unfitted model
    pub fn new(config: TrainingConfig) -> Self {
        let model = LogisticRegression::new()
            .with_alpha(config.alpha)
            .with_max_iter(config.max_iter)
            .with_learning_rate(config.learning_rate)
            .with_tol(config.tol);
        Self {
            config,
            feature_names: Vec::new(),
            model,
            metrics: None,
            is_fitted: false,
        }
    }

    /// Wrap an already-fitted classifier with its feature ordering
    pub fn from_parts(feature_names: Vec<String>, model: LogisticRegression) -> Result<Self> {
        if !model.is_fitted() {
            return Err(DonorcastError::ModelNotFitted);
        }
        if model.n_features() != Some(feature_names.len()) {
            return Err(DonorcastError::ShapeError {
                expected: format!("{} feature names", model.n_features().unwrap_or(0)),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Self {
            config: TrainingConfig::default(),
            feature_names,
            model,
            metrics: None,
            is_fitted: true,
        })
    }

    /// Fit on a frame whose non-target columns are all numeric
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .filter(|name| name != &self.config.target_column)
            .collect();

        let y = extract_target(df, &self.config.target_column)?;
        let x = extract_features(df, &feature_names)?;
        self.feature_names = feature_names;

        let (x_train, x_val, y_train, y_val) = self.train_val_split(&x, &y)?;
        self.model.fit(&x_train, &y_train)?;

        let mut metrics = if y_val.is_empty() {
            ModelMetrics::default()
        } else {
            let y_pred = self.model.predict(&x_val)?;
            ModelMetrics::compute_classification(&y_val, &y_pred)
        };
        metrics.n_samples = x.nrows();
        metrics.n_features = x.ncols();
        metrics.training_time_secs = start.elapsed().as_secs_f64();
        info!(
            n_samples = metrics.n_samples,
            n_features = metrics.n_features,
            accuracy = metrics.accuracy,
            "model fitted"
        );
        self.metrics = Some(metrics);

        self.is_fitted = true;
        Ok(self)
    }

    /// Predict 0/1 labels for a frame with the training feature columns
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(DonorcastError::ModelNotFitted);
        }
        let x = extract_features(df, &self.feature_names)?;
        self.model.predict(&x)
    }

    /// Predict 0/1 labels for an already-aligned matrix
    pub fn predict_matrix(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(DonorcastError::ModelNotFitted);
        }
        self.model.predict(x)
    }

    /// Accuracy against a frame carrying the target column
    pub fn score(&self, df: &DataFrame) -> Result<f64> {
        let y = extract_target(df, &self.config.target_column)?;
        let x = extract_features(df, &self.feature_names)?;
        self.model.score(&x, &y)
    }

    /// Training metrics, if fitted
    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    /// Feature columns in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Save the fitted model to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model from a file
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        Ok(model)
    }

    fn train_val_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
        let n = x.nrows();
        let val_size = (n as f64 * self.config.validation_split) as usize;
        let train_size = n - val_size;

        if train_size == 0 {
            return Err(DonorcastError::DataError(
                "validation split leaves no training rows".to_string(),
            ));
        }

        let x_train = x.slice(ndarray::s![..train_size, ..]).to_owned();
        let x_val = x.slice(ndarray::s![train_size.., ..]).to_owned();
        let y_train = y.slice(ndarray::s![..train_size]).to_owned();
        let y_val = y.slice(ndarray::s![train_size..]).to_owned();

        Ok((x_train, x_val, y_train, y_val))
    }
}

fn extract_target(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let series = df
        .column(target)
        .map_err(|_| DonorcastError::FeatureNotFound(target.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

fn extract_features(df: &DataFrame, feature_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = feature_names.len();
    let mut x_data = Vec::with_capacity(n_rows * n_cols);

    for name in feature_names {
        let series = df
            .column(name)
            .map_err(|_| DonorcastError::FeatureNotFound(name.clone()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let values: Vec<f64> = series
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        x_data.extend(values);
    }

    let x = Array2::from_shape_vec((n_cols, n_rows), x_data)
        .map_err(|e| DonorcastError::ShapeError {
            expected: format!("({}, {})", n_cols, n_rows),
            actual: e.to_string(),
        })?
        .t()
        .to_owned();

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_df() -> DataFrame {
        df!(
            "hours" => &[5.0, 10.0, 12.0, 15.0, 50.0, 55.0, 60.0, 65.0, 8.0, 58.0],
            "gain" => &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0],
            "income" => &[0i64, 0, 0, 0, 1, 1, 1, 1, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_predict() {
        let df = separable_df();
        let config = TrainingConfig::new("income")
            .with_validation_split(0.2)
            .with_learning_rate(0.5);
        let mut model = IncomeModel::new(config);

        model.fit(&df).unwrap();
        assert!(model.metrics().is_some());
        assert_eq!(model.feature_names(), &["hours", "gain"]);

        let predictions = model.predict(&df).unwrap();
        assert_eq!(predictions.len(), 10);
    }

    #[test]
    fn test_score_separable() {
        let df = separable_df();
        let config = TrainingConfig::new("income")
            .with_validation_split(0.0)
            .with_learning_rate(0.5);
        let mut model = IncomeModel::new(config);
        model.fit(&df).unwrap();

        let accuracy = model.score(&df).unwrap();
        assert!(accuracy >= 0.8, "accuracy {} too low", accuracy);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = IncomeModel::new(TrainingConfig::default());
        let df = separable_df();
        assert!(matches!(
            model.predict(&df),
            Err(DonorcastError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let df = separable_df();
        let config = TrainingConfig::new("income").with_validation_split(0.0);
        let mut model = IncomeModel::new(config);
        model.fit(&df).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        model.save(path).unwrap();

        let loaded = IncomeModel::load(path).unwrap();
        assert_eq!(loaded.feature_names(), model.feature_names());

        let a = model.predict(&df).unwrap();
        let b = loaded.predict(&df).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_parts_validates() {
        let unfitted = LogisticRegression::new();
        assert!(IncomeModel::from_parts(vec!["a".to_string()], unfitted).is_err());
    }
}
