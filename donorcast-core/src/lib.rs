//! Donorcast Core - census-income analysis and donor inference
//!
//! This crate provides the core functionality for the donorcast toolkit:
//! CSV data loading, class-split feature exploration, one-hot encoding of
//! categorical columns, classifier training, and alignment of single JSON
//! records onto the fixed feature schema for inference.

pub mod align;
pub mod error;
pub mod explore;
pub mod inference;
pub mod preprocessing;
pub mod schema;
pub mod training;
pub mod utils;

pub use error::{DonorcastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::align::{FeatureAligner, FeatureVector, FieldValue, RawRecord};
    pub use crate::error::{DonorcastError, Result};
    pub use crate::explore::{ExploreConfig, FeatureSummary};
    pub use crate::inference::{DonorClass, InferenceSession};
    pub use crate::preprocessing::DummyEncoder;
    pub use crate::schema::Schema;
    pub use crate::training::{IncomeModel, LogisticRegression, TrainingConfig};
    pub use crate::utils::DataLoader;
}
