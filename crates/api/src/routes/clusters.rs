//! Cluster Summary Routes

use axum::{
    extract::{Query, State},
    Json,
};
use inference_engine::RiskLabel;
use serde::Deserialize;

use crate::error::ApiError;
use crate::summary::{ClusterSummary, RecordPage};
use crate::SharedState;

/// Query parameters for the clusters endpoint
#[derive(Debug, Deserialize)]
pub struct ClusterQuery {
    /// Comma-separated risk labels; all labels when omitted
    pub labels: Option<String>,
}

/// Largest page the records endpoint returns
pub const MAX_PAGE_SIZE: usize = 1000;

/// Query parameters for the records endpoint
#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    /// Comma-separated risk labels; all labels when omitted
    pub labels: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

fn parse_labels(raw: Option<&str>) -> Result<Vec<RiskLabel>, ApiError> {
    match raw {
        None => Ok(RiskLabel::ALL.to_vec()),
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<RiskLabel>().map_err(|e| ApiError::BadRequest(e.to_string())))
            .collect(),
    }
}

/// Get the risk distribution of the reference data
pub async fn get_clusters(
    State(state): State<SharedState>,
    Query(params): Query<ClusterQuery>,
) -> Result<Json<ClusterSummary>, ApiError> {
    let summary = state
        .summary
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no reference data loaded".to_string()))?;
    let labels = parse_labels(params.labels.as_deref())?;
    Ok(Json(summary.filter(&labels)))
}

/// Get classified reference records, filtered by label and paginated
pub async fn get_records(
    State(state): State<SharedState>,
    Query(params): Query<RecordQuery>,
) -> Result<Json<RecordPage>, ApiError> {
    let records = state
        .records
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no reference data loaded".to_string()))?;
    let labels = parse_labels(params.labels.as_deref())?;
    if params.limit == 0 {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }
    let limit = params.limit.min(MAX_PAGE_SIZE);
    Ok(Json(records.page(&labels, params.offset, limit)))
}
