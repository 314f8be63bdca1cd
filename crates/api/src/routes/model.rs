//! Model Metadata Route

use axum::{extract::State, Json};
use feature_engine::AlignmentPolicy;
use inference_engine::RiskLabel;
use serde::Serialize;

use crate::SharedState;

/// Description of the loaded model
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub dimension: usize,
    pub clusters: usize,
    pub labels: Vec<RiskLabel>,
    pub feature_names: Vec<String>,
    pub alignment: AlignmentPolicy,
    /// Features with zero variance, standardized to a constant 0
    pub degenerate_features: Vec<usize>,
}

/// Get model metadata
pub async fn get_model(State(state): State<SharedState>) -> Json<ModelInfo> {
    let context = &state.context;
    Json(ModelInfo {
        dimension: context.dimension(),
        clusters: context.n_clusters(),
        labels: RiskLabel::ALL.to_vec(),
        feature_names: context.feature_names().to_vec(),
        alignment: context.aligner().policy(),
        degenerate_features: context.normalizer().params().degenerate_features(),
    })
}
