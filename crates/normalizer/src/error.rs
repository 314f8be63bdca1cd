//! Normalization Error Types

use thiserror::Error;

/// Errors while fitting or applying normalization parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    /// No rows or no columns to fit on
    #[error("cannot fit normalization on an empty table")]
    EmptyInput,

    /// A row does not have the width of the first row
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Vector length differs from the fitted dimensionality
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Parameter value is unusable
    #[error("invalid parameter for feature {feature}: {reason}")]
    InvalidParameter {
        feature: usize,
        reason: &'static str,
    },
}
