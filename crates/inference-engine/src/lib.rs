//! Risk Cluster Inference
//!
//! Classifies crime feature vectors into one of four risk categories with a
//! fitted nearest-centroid model. [`InferenceContext`] bundles the aligner,
//! normalizer and model; build it once and share it behind an `Arc`.

mod artifact;
mod context;
mod label;
mod model;

pub use artifact::ModelArtifact;
pub use context::{BatchClassification, InferenceContext, VectorClassification};
pub use label::{ClusterAssignment, RiskLabel, UnknownLabel};
pub use model::ClusteringModel;

use feature_engine::ShapeError;
use normalizer::NormalizationError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Input could not be reconciled with the feature space
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    /// Model returned a cluster index without a label
    #[error("Model defect: cluster index {cluster} has no label ({known} labels defined)")]
    ModelDefect { cluster: usize, known: usize },
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model save failed: {0}")]
    ModelSaveError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
