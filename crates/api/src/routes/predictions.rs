//! Prediction Routes

use axum::{body::Bytes, extract::rejection::JsonRejection, extract::State, Json};
use feature_engine::{AlignmentWarning, Cell, RawTable};
use inference_engine::{BatchClassification, ClusterAssignment};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::upload::parse_csv;
use crate::SharedState;

/// Body of a single prediction request
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Feature values in training order; `null` marks a missing value
    pub features: Vec<Option<f64>>,
}

/// Single prediction
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub assignment: ClusterAssignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_warning: Option<String>,
}

/// Body of a batch prediction request
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub rows: Vec<Vec<Cell>>,
    /// Column names; positional names are used when omitted
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Batch predictions, one per input row
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub data: Vec<ClusterAssignment>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_warning: Option<String>,
    pub dropped_columns: Vec<String>,
    pub imputed_cells: usize,
}

/// Uploaded row echoed back with its prediction
#[derive(Debug, Serialize)]
pub struct UploadedRow {
    pub row: Vec<Cell>,
    #[serde(flatten)]
    pub assignment: ClusterAssignment,
}

/// Predictions for an uploaded CSV
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub columns: Vec<String>,
    pub data: Vec<UploadedRow>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment_warning: Option<String>,
    pub dropped_columns: Vec<String>,
    pub imputed_cells: usize,
}

fn record(route: &'static str, rows: usize, warning: Option<&AlignmentWarning>, started: Instant) {
    counter!("classifications_total", "route" => route).increment(rows as u64);
    if warning.is_some() {
        counter!("alignment_warnings_total", "route" => route).increment(1);
    }
    histogram!("classification_latency_seconds", "route" => route)
        .record(started.elapsed().as_secs_f64());
}

/// Classify one feature vector
pub async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let started = Instant::now();

    let values: Vec<f64> = request
        .features
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let result = state.context.classify_vector(&values)?;

    record("predict", 1, result.alignment_warning.as_ref(), started);

    Ok(Json(PredictResponse {
        assignment: result.assignment,
        alignment_warning: result.alignment_warning.map(|w| w.to_string()),
    }))
}

/// Classify a JSON table
pub async fn predict_batch(
    State(state): State<SharedState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload?;
    let started = Instant::now();

    let table = match request.columns {
        Some(columns) => RawTable::new(columns, request.rows),
        None => RawTable::from_rows(request.rows),
    }
    .map_err(inference_engine::InferenceError::from)?;

    let batch = classify_blocking(&state, table).await?.1;
    record("batch", batch.assignments.len(), batch.alignment_warning.as_ref(), started);

    Ok(Json(BatchResponse {
        count: batch.assignments.len(),
        data: batch.assignments,
        alignment_warning: batch.alignment_warning.map(|w| w.to_string()),
        dropped_columns: batch.dropped_columns,
        imputed_cells: batch.imputed_cells,
    }))
}

/// Classify an uploaded CSV (header row required)
pub async fn predict_upload(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let started = Instant::now();
    let table = parse_csv(&body)?;

    let (table, batch) = classify_blocking(&state, table).await?;
    record("upload", batch.assignments.len(), batch.alignment_warning.as_ref(), started);

    let columns = table.columns().to_vec();
    let data: Vec<UploadedRow> = table
        .rows()
        .iter()
        .cloned()
        .zip(batch.assignments)
        .map(|(row, assignment)| UploadedRow { row, assignment })
        .collect();

    Ok(Json(UploadResponse {
        columns,
        count: data.len(),
        data,
        alignment_warning: batch.alignment_warning.map(|w| w.to_string()),
        dropped_columns: batch.dropped_columns,
        imputed_cells: batch.imputed_cells,
    }))
}

/// Run batch classification on the blocking pool, handing the table back
async fn classify_blocking(
    state: &SharedState,
    table: RawTable,
) -> Result<(RawTable, BatchClassification), ApiError> {
    let context = Arc::clone(&state.context);
    let (table, result) = tokio::task::spawn_blocking(move || {
        let result = context.classify_batch(&table);
        (table, result)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("classification task failed: {}", e)))?;
    Ok((table, result?))
}
