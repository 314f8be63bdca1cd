//! Shape Error Types

use thiserror::Error;

/// Input that cannot be reconciled with the model's feature space
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Single vector without any value
    #[error("feature vector is empty")]
    EmptyVector,

    /// No column survived numeric selection
    #[error("input has no numeric columns ({columns} column(s) present)")]
    NoNumericColumns { columns: usize },

    /// Row width differs from the column list
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Width mismatch rejected under strict alignment
    #[error("input has {found} numeric features but model expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}
