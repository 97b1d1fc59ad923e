//! Data loading and export utilities

mod data_loader;

pub use data_loader::{binarize_income, save_predictions, DataLoader};
