//! Z-Score Normalization with Frozen Parameters

use crate::error::NormalizationError;
use crate::statistics::ColumnStatistics;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Standard deviations at or below this value mark a degenerate feature.
///
/// A degenerate feature standardizes to the constant `0.0`.
pub const DEGENERATE_STD_DEV: f64 = 1e-12;

/// Per-feature mean and standard deviation learned at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    /// Mean of each feature, in training column order
    pub mean: Vec<f64>,
    /// Population standard deviation of each feature
    pub std_dev: Vec<f64>,
}

impl NormalizationParams {
    /// Create validated parameters
    pub fn new(mean: Vec<f64>, std_dev: Vec<f64>) -> Result<Self, NormalizationError> {
        let params = Self { mean, std_dev };
        params.validate()?;
        Ok(params)
    }

    /// Check lengths and values. Deserialized parameters must pass this
    /// before use.
    pub fn validate(&self) -> Result<(), NormalizationError> {
        if self.mean.is_empty() {
            return Err(NormalizationError::EmptyInput);
        }
        if self.mean.len() != self.std_dev.len() {
            return Err(NormalizationError::DimensionMismatch {
                expected: self.mean.len(),
                found: self.std_dev.len(),
            });
        }
        for (feature, (&m, &s)) in self.mean.iter().zip(&self.std_dev).enumerate() {
            if !m.is_finite() {
                return Err(NormalizationError::InvalidParameter {
                    feature,
                    reason: "mean is not finite",
                });
            }
            if !s.is_finite() || s < 0.0 {
                return Err(NormalizationError::InvalidParameter {
                    feature,
                    reason: "standard deviation must be finite and non-negative",
                });
            }
        }
        Ok(())
    }

    /// Number of features
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Indices of features whose standard deviation is degenerate
    pub fn degenerate_features(&self) -> Vec<usize> {
        self.std_dev
            .iter()
            .enumerate()
            .filter(|(_, &s)| s <= DEGENERATE_STD_DEV)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Standardizes feature vectors with parameters frozen at construction
#[derive(Debug, Clone)]
pub struct Normalizer {
    params: NormalizationParams,
}

impl Normalizer {
    /// Wrap already validated parameters
    pub fn new(params: NormalizationParams) -> Result<Self, NormalizationError> {
        params.validate()?;
        let degenerate = params.degenerate_features();
        if !degenerate.is_empty() {
            warn!(
                "{} zero-variance feature(s) will standardize to 0: {:?}",
                degenerate.len(),
                degenerate
            );
        }
        Ok(Self { params })
    }

    /// Fit per-column mean and population standard deviation.
    ///
    /// Non-finite cells are skipped per column; a column without any finite
    /// value gets mean 0 and standard deviation 0.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, NormalizationError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(NormalizationError::EmptyInput);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(NormalizationError::RaggedRow {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let stats = ColumnStatistics::compute_columns(rows, width);
        let mean = stats.iter().map(|s| s.mean).collect();
        let std_dev = stats.iter().map(|s| s.std_dev).collect();

        info!("Fitted normalization on {} rows x {} features", rows.len(), width);
        Self::new(NormalizationParams::new(mean, std_dev)?)
    }

    /// Fitted parameters
    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Number of features expected by `standardize`
    pub fn dimension(&self) -> usize {
        self.params.dimension()
    }

    /// Map a raw vector to `(x - mean) / std` per component
    pub fn standardize(&self, vector: &[f64]) -> Result<Vec<f64>, NormalizationError> {
        self.check_len(vector.len())?;
        Ok(vector
            .iter()
            .zip(self.params.mean.iter().zip(&self.params.std_dev))
            .map(|(&x, (&m, &s))| {
                if s <= DEGENERATE_STD_DEV {
                    0.0
                } else {
                    (x - m) / s
                }
            })
            .collect())
    }

    /// Map a standardized vector back into raw feature space.
    ///
    /// Degenerate features map back to their mean.
    pub fn inverse(&self, vector: &[f64]) -> Result<Vec<f64>, NormalizationError> {
        self.check_len(vector.len())?;
        Ok(vector
            .iter()
            .zip(self.params.mean.iter().zip(&self.params.std_dev))
            .map(|(&z, (&m, &s))| {
                if s <= DEGENERATE_STD_DEV {
                    m
                } else {
                    z * s + m
                }
            })
            .collect())
    }

    fn check_len(&self, found: usize) -> Result<(), NormalizationError> {
        let expected = self.dimension();
        if found != expected {
            debug!("Rejecting vector of length {} (expected {})", found, expected);
            return Err(NormalizationError::DimensionMismatch { expected, found });
        }
        Ok(())
    }
}
