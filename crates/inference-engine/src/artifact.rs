//! Persisted Model Artifact

use crate::InferenceError;
use normalizer::NormalizationParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// JSON document produced by an offline fit.
///
/// `normalization` may be absent, in which case the normalizer is fitted at
/// startup from reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Training column names, in feature order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<NormalizationParams>,
    /// One row per cluster, in standardized feature space
    pub centroids: Vec<Vec<f64>>,
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        serde_json::from_str(json).map_err(|e| InferenceError::ModelLoadError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, InferenceError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InferenceError::ModelSaveError(e.to_string()))
    }

    /// Read an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let artifact = Self::from_json(&json)?;
        info!(
            "Loaded model artifact {} ({} centroids)",
            path.display(),
            artifact.centroids.len()
        );
        Ok(artifact)
    }

    /// Write the artifact as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), InferenceError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| {
            InferenceError::ModelSaveError(format!("{}: {}", path.display(), e))
        })
    }
}
