//! API error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::ShapeError;
use inference_engine::InferenceError;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::upload::UploadError;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Inference(InferenceError::Shape(ShapeError::DimensionMismatch { .. })) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "alignment_error")
            }
            ApiError::Inference(InferenceError::Shape(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "shape_error")
            }
            ApiError::Inference(InferenceError::ModelDefect { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "model_defect")
            }
            ApiError::Inference(_) | ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            error!("Request failed ({}): {}", kind, self);
        } else {
            warn!("Request rejected ({}): {}", kind, self);
        }
        counter!("classification_errors_total", "kind" => kind).increment(1);

        let body = ErrorBody {
            error: self.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Shape(shape) => ApiError::Inference(InferenceError::Shape(shape)),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
