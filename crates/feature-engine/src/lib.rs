//! Feature Alignment Engine
//!
//! Reconciles arbitrary numeric input tables with the fixed feature space a
//! fitted model expects: numeric column selection, truncation, zero padding
//! and batch-mean imputation.

mod aligner;
mod error;
mod table;

pub use aligner::{AlignedVector, Alignment, AlignmentPolicy, AlignmentWarning, FeatureAligner};
pub use error::ShapeError;
pub use table::{Cell, FeatureTable, RawTable};
