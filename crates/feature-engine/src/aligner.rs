//! Feature Alignment
//!
//! Maps an input table of any width onto the model's `D` features:
//!
//! 1. keep only numeric columns, in their original order
//! 2. truncate to the first `D` of them, or pad with zero columns up to `D`
//! 3. impute missing cells with the mean of their column in the same batch,
//!    falling back to `0.0` for a column without any value
//!
//! A width mismatch is a warning under [`AlignmentPolicy::Lenient`] and an
//! error under [`AlignmentPolicy::Strict`].

use crate::error::ShapeError;
use crate::table::{FeatureTable, RawTable};
use normalizer::ColumnStatistics;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// How to treat inputs whose numeric width differs from the model's
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Trim or pad and carry on, reporting a warning
    #[default]
    Lenient,
    /// Reject any width mismatch
    Strict,
}

impl AlignmentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentPolicy::Lenient => "lenient",
            AlignmentPolicy::Strict => "strict",
        }
    }
}

/// Numeric width of the input differed from the model's dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlignmentWarning {
    /// Numeric columns present in the input
    pub found: usize,
    /// Features the model expects
    pub expected: usize,
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uploaded data has {} numeric features but model expects {}; results may be inaccurate",
            self.found, self.expected
        )
    }
}

/// Result of aligning a table
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// `D`-wide table of finite values, one row per input row
    pub table: FeatureTable,
    /// Set when the numeric width differed from `D`
    pub warning: Option<AlignmentWarning>,
    /// Names of the non-numeric columns that were dropped
    pub dropped_columns: Vec<String>,
    /// Number of cells filled by imputation
    pub imputed_cells: usize,
}

/// Result of aligning a single vector
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    pub values: Vec<f64>,
    pub warning: Option<AlignmentWarning>,
}

/// Aligns inputs to a fixed feature dimensionality
#[derive(Debug, Clone, Copy)]
pub struct FeatureAligner {
    dimension: usize,
    policy: AlignmentPolicy,
}

impl FeatureAligner {
    /// Create an aligner targeting `dimension` features
    pub fn new(dimension: usize, policy: AlignmentPolicy) -> Self {
        Self { dimension, policy }
    }

    /// Target dimensionality `D`
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    /// Compare an input width against `D` under the configured policy
    pub fn check_width(&self, found: usize) -> Result<Option<AlignmentWarning>, ShapeError> {
        if found == self.dimension {
            return Ok(None);
        }
        match self.policy {
            AlignmentPolicy::Strict => Err(ShapeError::DimensionMismatch {
                expected: self.dimension,
                found,
            }),
            AlignmentPolicy::Lenient => Ok(Some(AlignmentWarning {
                found,
                expected: self.dimension,
            })),
        }
    }

    /// Align a whole table
    pub fn align_table(&self, table: &RawTable) -> Result<Alignment, ShapeError> {
        let numeric = table.numeric_columns();
        if numeric.is_empty() {
            return Err(ShapeError::NoNumericColumns {
                columns: table.width(),
            });
        }

        let dropped_columns: Vec<String> = (0..table.width())
            .filter(|col| !numeric.contains(col))
            .map(|col| table.columns()[col].clone())
            .collect();
        if !dropped_columns.is_empty() {
            debug!("Dropping non-numeric columns: {:?}", dropped_columns);
        }

        let warning = self.check_width(numeric.len())?;
        if let Some(w) = &warning {
            warn!("{}", w);
        }

        let kept = &numeric[..numeric.len().min(self.dimension)];

        // NaN marks a missing cell until imputation
        let mut grid: Vec<Vec<f64>> = table
            .rows()
            .iter()
            .map(|row| {
                let mut out = Vec::with_capacity(self.dimension);
                out.extend(
                    kept.iter()
                        .map(|&col| row[col].as_number().unwrap_or(f64::NAN)),
                );
                out.resize(self.dimension, 0.0);
                out
            })
            .collect();

        let fills: Vec<f64> = ColumnStatistics::compute_columns(&grid, self.dimension)
            .iter()
            .map(|stats| stats.mean_opt().filter(|m| m.is_finite()).unwrap_or(0.0))
            .collect();

        let mut imputed_cells = 0;
        for row in &mut grid {
            for (value, &fill) in row.iter_mut().zip(&fills) {
                if !value.is_finite() {
                    *value = fill;
                    imputed_cells += 1;
                }
            }
        }
        if imputed_cells > 0 {
            debug!("Imputed {} missing cell(s) with batch column means", imputed_cells);
        }

        Ok(Alignment {
            table: FeatureTable::new(self.dimension, grid),
            warning,
            dropped_columns,
            imputed_cells,
        })
    }

    /// Align a single vector. Non-finite values count as missing.
    pub fn align_vector(&self, values: &[f64]) -> Result<AlignedVector, ShapeError> {
        if values.is_empty() {
            return Err(ShapeError::EmptyVector);
        }
        let alignment = self.align_table(&RawTable::from_vector(values))?;
        let values = alignment
            .table
            .into_rows()
            .into_iter()
            .next()
            .unwrap_or_else(|| vec![0.0; self.dimension]);
        Ok(AlignedVector {
            values,
            warning: alignment.warning,
        })
    }
}
