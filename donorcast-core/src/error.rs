//! Error types for the donorcast toolkit

use thiserror::Error;

/// Result type alias for donorcast operations
pub type Result<T> = std::result::Result<T, DonorcastError>;

/// Main error type for the donorcast toolkit
#[derive(Error, Debug)]
pub enum DonorcastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Schema mismatch: model expects {actual} features, schema has {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl From<polars::error::PolarsError> for DonorcastError {
    fn from(err: polars::error::PolarsError) -> Self {
        DonorcastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for DonorcastError {
    fn from(err: serde_json::Error) -> Self {
        DonorcastError::SerializationError(err.to_string())
    }
}
