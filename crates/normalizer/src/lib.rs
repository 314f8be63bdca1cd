//! Feature Standardization
//!
//! Provides fitted z-score normalization and nan-aware column statistics.

mod error;
mod normalizer;
mod statistics;

pub use error::NormalizationError;
pub use normalizer::{NormalizationParams, Normalizer, DEGENERATE_STD_DEV};
pub use statistics::ColumnStatistics;
