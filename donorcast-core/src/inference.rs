//! Single-record inference
//!
//! An inference session loads the persisted classifier once, verifies it was
//! trained on the exact slot layout the aligner produces, and then maps raw
//! JSON records to donor labels.

use crate::align::{FeatureAligner, RawRecord};
use crate::error::{DonorcastError, Result};
use crate::training::IncomeModel;
use tracing::info;

/// Predicted donor class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorClass {
    /// Classifier output 0
    Regular,
    /// Classifier output 1
    High,
}

impl DonorClass {
    /// Map a 0/1 classifier output to a class
    pub fn from_prediction(value: f64) -> Self {
        if value >= 0.5 {
            DonorClass::High
        } else {
            DonorClass::Regular
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DonorClass::Regular => "Regular Donor",
            DonorClass::High => "High Donor",
        }
    }
}

impl std::fmt::Display for DonorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Loaded classifier plus aligner, reused across predictions
#[derive(Debug)]
pub struct InferenceSession {
    aligner: FeatureAligner,
    model: IncomeModel,
}

impl InferenceSession {
    /// Build a session, verifying the model matches the schema.
    ///
    /// The persisted artifact records the feature columns it was trained on;
    /// a width or ordering difference means the vector positions would feed
    /// the wrong coefficients, so the session refuses to start.
    pub fn new(aligner: FeatureAligner, model: IncomeModel) -> Result<Self> {
        let expected = aligner.schema().len();
        let actual = model.feature_names().len();
        if expected != actual {
            return Err(DonorcastError::SchemaMismatch { expected, actual });
        }

        let slot_names = aligner.schema().slot_names();
        if model.feature_names() != slot_names.as_slice() {
            return Err(DonorcastError::SchemaMismatch { expected, actual });
        }

        Ok(Self { aligner, model })
    }

    /// Load the persisted model and build a session over the census schema
    pub fn load(model_path: &str) -> Result<Self> {
        let model = IncomeModel::load(model_path)?;
        Self::new(FeatureAligner::adult(), model)
    }

    /// The aligner in use
    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    /// Predict the donor class for one raw record
    pub fn predict_record(&self, record: &RawRecord) -> Result<DonorClass> {
        let vector = self.aligner.align(record)?;
        let predictions = self.model.predict_matrix(&vector.to_row())?;
        let class = DonorClass::from_prediction(predictions[0]);
        info!(prediction = %class, "classified record");
        Ok(class)
    }

    /// Predict the donor class for a JSON object string
    pub fn predict_json(&self, json: &str) -> Result<DonorClass> {
        let record = RawRecord::from_json_str(json)?;
        self.predict_record(&record)
    }
}
