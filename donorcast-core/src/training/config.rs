//! Training configuration

use serde::{Deserialize, Serialize};

/// Configuration for classifier training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,
    /// Fraction of rows held out for validation
    pub validation_split: f64,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Gradient-descent learning rate
    pub learning_rate: f64,
    /// L2 regularization strength
    pub alpha: f64,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: "income".to_string(),
            validation_split: 0.2,
            max_iter: 1000,
            learning_rate: 0.1,
            alpha: 0.01,
            tol: 1e-6,
        }
    }
}

impl TrainingConfig {
    /// Create a configuration for a target column
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target_column: target.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the validation split
    pub fn with_validation_split(mut self, split: f64) -> Self {
        self.validation_split = split;
        self
    }

    /// Builder method to set the iteration cap
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Builder method to set the learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Builder method to set the L2 strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}
