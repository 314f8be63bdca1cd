//! Crime Risk Classification API Server
//!
//! REST API over the shared inference context: single, batch and CSV upload
//! predictions plus the reference data cluster summary.

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inference_engine::{InferenceContext, ModelArtifact};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;
pub mod summary;
pub mod upload;

#[cfg(test)]
mod tests;

pub use crate::config::{AppConfig, LoggingConfig, ModelConfig};
pub use crate::error::ApiError;

use crate::config::ServerConfig;
use crate::rate_limit::{create_governor_config, DefaultGovernorConfig};
use crate::summary::{classify_reference, ClusterSummary, ReferenceRecords};

/// Application state shared across handlers
pub struct AppState {
    /// Read-only inference context
    pub context: Arc<InferenceContext>,
    /// Distribution of the reference data, when loaded
    pub summary: Option<ClusterSummary>,
    /// Classified reference rows, when loaded
    pub records: Option<ReferenceRecords>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
}

/// State handle given to the router
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state around an inference context
    pub fn new(context: InferenceContext) -> Self {
        Self {
            context: Arc::new(context),
            summary: None,
            records: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            max_upload_bytes: ServerConfig::default().max_upload_bytes,
            metrics: None,
        }
    }

    pub fn with_summary(mut self, summary: ClusterSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_records(mut self, records: ReferenceRecords) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
    pub reference_records: Option<usize>,
}

/// Loaded model shape
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub dimension: usize,
    pub clusters: usize,
    pub alignment: String,
}

/// Create the application router.
///
/// `rate_limit` guards the prediction routes; it needs peer addresses, so
/// serve with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(
    state: SharedState,
    rate_limit: Option<Arc<DefaultGovernorConfig>>,
) -> Router {
    let mut predictions = Router::new()
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/api/v1/predict/batch", post(routes::predictions::predict_batch))
        .route("/api/v1/predict/upload", post(routes::predictions::predict_upload));
    if let Some(config) = rate_limit {
        predictions = predictions.layer(GovernorLayer { config });
    }

    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/model", get(routes::model::get_model))
        .route("/api/v1/clusters", get(routes::clusters::get_clusters))
        .route("/api/v1/clusters/records", get(routes::clusters::get_records))
        .route("/metrics", get(metrics_handler))
        .merge(predictions)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Crime Cluster Predictor API is Running!"
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelHealth {
            dimension: state.context.dimension(),
            clusters: state.context.n_clusters(),
            alignment: state.context.aligner().policy().as_str().to_string(),
        },
        reference_records: state.summary.as_ref().map(|s| s.records),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<SharedState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("metrics recorder not installed".to_string()))
}

/// Initialize logging
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let parsed = config.max_level();
    let level = parsed.as_ref().copied().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    if let Err(e) = parsed {
        warn!("{}; logging at info", e);
    }
    Ok(())
}

/// Load the model artifact and optional reference data into application state
pub fn build_state(config: &ModelConfig) -> anyhow::Result<AppState> {
    let artifact = ModelArtifact::load(&config.artifact_path)
        .with_context(|| format!("loading model artifact {}", config.artifact_path))?;

    let reference = config
        .reference_data_path
        .as_deref()
        .map(|path| {
            upload::read_csv_file(path).with_context(|| format!("reading reference data {}", path))
        })
        .transpose()?;
    let reference_rows = reference.as_ref().map(|table| table.numeric_rows());

    let context =
        InferenceContext::from_artifact(artifact, reference_rows.as_deref(), config.alignment)
            .context("building inference context")?;

    let classified = reference
        .as_ref()
        .map(|table| classify_reference(&context, table))
        .transpose()
        .context("classifying reference data")?;

    let mut state = AppState::new(context);
    if let Some((summary, records)) = classified {
        state = state.with_summary(summary).with_records(records);
    }
    Ok(state)
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;

    let state = build_state(&config.model)?
        .with_metrics(metrics)
        .with_max_upload_bytes(config.server.max_upload_bytes);

    let rate_limit = if config.rate_limit.enabled {
        Some(create_governor_config(&config.rate_limit).context("invalid rate limit configuration")?)
    } else {
        None
    };

    let app = create_router(Arc::new(state), rate_limit);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
