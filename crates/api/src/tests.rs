use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use feature_engine::{AlignmentPolicy, RawTable};
use inference_engine::{ClusteringModel, InferenceContext};
use normalizer::{NormalizationParams, Normalizer};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::summary::{classify_reference, ClusterSummary};
use crate::upload::parse_csv;
use crate::{build_state, create_router, AppState, ModelConfig};

fn context(policy: AlignmentPolicy) -> InferenceContext {
    let params = NormalizationParams::new(vec![10.0, 20.0, 30.0, 40.0], vec![1.0; 4]).unwrap();
    let model = ClusteringModel::new(vec![
        vec![0.0, 0.0, 0.0, 0.0],
        vec![5.0, 0.0, 0.0, 0.0],
        vec![10.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.0, -30.0, -40.0],
    ])
    .unwrap();
    InferenceContext::new(Normalizer::new(params).unwrap(), model, policy).unwrap()
}

fn app(state: AppState) -> Router {
    create_router(Arc::new(state), None)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_csv(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(app(AppState::new(context(AlignmentPolicy::Lenient))), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Crime Cluster Predictor API is Running!".to_string()));
}

#[tokio::test]
async fn test_health() {
    let (status, body) =
        send(app(AppState::new(context(AlignmentPolicy::Lenient))), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"]["dimension"], 4);
    assert_eq!(body["model"]["clusters"], 4);
    assert_eq!(body["model"]["alignment"], "lenient");
}

#[tokio::test]
async fn test_predict_pads_short_vector() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_json("/api/v1/predict", json!({ "features": [10, 20] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cluster"], 3);
    assert_eq!(body["label"], "Severe Risk");
    assert!(body["alignment_warning"]
        .as_str()
        .unwrap()
        .contains("2 numeric features"));
}

#[tokio::test]
async fn test_predict_exact_vector_has_no_warning() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Strict))),
        post_json("/api/v1/predict", json!({ "features": [20, 20, 30, 40] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "High Risk");
    assert!(body.get("alignment_warning").is_none());
}

#[tokio::test]
async fn test_predict_empty_vector_is_shape_error() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_json("/api/v1/predict", json!({ "features": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "shape_error");
}

#[tokio::test]
async fn test_predict_strict_mismatch() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Strict))),
        post_json("/api/v1/predict", json!({ "features": [1, 2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "alignment_error");
}

#[tokio::test]
async fn test_predict_malformed_body() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_json("/api/v1/predict", json!({ "values": [1, 2] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn test_batch_drops_text_and_imputes() {
    let request = json!({
        "columns": ["state", "a", "b", "c", "d"],
        "rows": [
            ["Goa", 10, 20, 30, 40],
            ["Assam", 20, 20, null, 40],
        ]
    });
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_json("/api/v1/predict/batch", request),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["label"], "Low Risk");
    assert_eq!(body["data"][1]["label"], "High Risk");
    assert_eq!(body["dropped_columns"], json!(["state"]));
    assert_eq!(body["imputed_cells"], 1);
    assert!(body.get("alignment_warning").is_none());
}

#[tokio::test]
async fn test_batch_ragged_rows() {
    let request = json!({ "rows": [[1, 2], [1]] });
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_json("/api/v1/predict/batch", request),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "shape_error");
}

#[tokio::test]
async fn test_upload_echoes_rows() {
    let csv = "STATE,MURDER,RAPE\nGoa,10,20\nBihar,15,\n";
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_csv("/api/v1/predict/upload", csv),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["STATE", "MURDER", "RAPE"]));
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["row"], json!(["Goa", 10.0, 20.0]));
    assert_eq!(body["data"][0]["label"], "Severe Risk");
    assert_eq!(body["data"][1]["row"][2], Value::Null);
    assert!(body["alignment_warning"].is_string());
}

#[tokio::test]
async fn test_upload_header_only() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_csv("/api/v1/predict/upload", "a,b,c\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    assert!(body["alignment_warning"]
        .as_str()
        .unwrap()
        .contains("3 numeric features"));
}

#[tokio::test]
async fn test_upload_malformed_csv() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        post_csv("/api/v1/predict/upload", "a,b\n1,2\n3\n"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn test_clusters_without_reference_data() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        get("/api/v1/clusters"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_clusters_filtered() {
    let ctx = context(AlignmentPolicy::Lenient);
    let reference: RawTable =
        parse_csv(b"a,b,c,d\n10,20,30,40\n20,20,30,40\n10,20,0,0\n11,20,30,40\n").unwrap();
    let (summary, _) = classify_reference(&ctx, &reference).unwrap();
    let state = AppState::new(ctx).with_summary(summary);

    let (status, body) = send(app(state), get("/api/v1/clusters?labels=Low%20Risk,Severe%20Risk")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 3);
    assert_eq!(body["clusters"][0]["label"], "Low Risk");
    assert_eq!(body["clusters"][0]["count"], 2);
    assert_eq!(body["clusters"][0]["total"], 201.0);
    assert_eq!(body["clusters"][1]["label"], "Severe Risk");
    assert_eq!(body["clusters"][1]["total"], 30.0);
}

#[tokio::test]
async fn test_clusters_unknown_label() {
    let ctx = context(AlignmentPolicy::Lenient);
    let summary = ClusterSummary::build(&[], &[]);
    let state = AppState::new(ctx).with_summary(summary);
    let (status, _) = send(app(state), get("/api/v1/clusters?labels=Extreme")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn reference_state() -> AppState {
    let ctx = context(AlignmentPolicy::Lenient);
    let reference = parse_csv(
        b"STATE,a,b,c,d\nGoa,10,20,30,40\nBihar,20,20,30,40\nKerala,10,20,0,0\nAssam,11,20,30,40\n",
    )
    .unwrap();
    let (summary, records) = classify_reference(&ctx, &reference).unwrap();
    AppState::new(ctx).with_summary(summary).with_records(records)
}

#[tokio::test]
async fn test_records_filtered_and_paged() {
    let (status, body) = send(
        app(reference_state()),
        get("/api/v1/clusters/records?labels=Low%20Risk&offset=1&limit=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["STATE", "a", "b", "c", "d"]));
    assert_eq!(body["matching"], 2);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["row"][0], "Assam");
    assert_eq!(body["data"][0]["cluster"], 0);
    assert_eq!(body["data"][0]["label"], "Low Risk");
    assert_eq!(body["data"][0]["total"], 101.0);
}

#[tokio::test]
async fn test_records_default_page() {
    let (status, body) = send(app(reference_state()), get("/api/v1/clusters/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matching"], 4);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"][2]["label"], "Severe Risk");
    assert_eq!(body["data"][2]["total"], 30.0);
}

#[tokio::test]
async fn test_records_rejects_zero_limit() {
    let (status, _) =
        send(app(reference_state()), get("/api/v1/clusters/records?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_records_without_reference_data() {
    let (status, body) = send(
        app(AppState::new(context(AlignmentPolicy::Lenient))),
        get("/api/v1/clusters/records"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) =
        send(app(AppState::new(context(AlignmentPolicy::Strict))), get("/api/v1/model")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dimension"], 4);
    assert_eq!(
        body["labels"],
        json!(["Low Risk", "Moderate Risk", "High Risk", "Severe Risk"])
    );
    assert_eq!(body["alignment"], "strict");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (status, _) =
        send(app(AppState::new(context(AlignmentPolicy::Lenient))), get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn test_build_state_fits_reference() {
    let dir = std::env::temp_dir();
    let id = std::process::id();
    let artifact_path = dir.join(format!("crime-risk-model-{}.json", id));
    let reference_path = dir.join(format!("crime-risk-reference-{}.csv", id));

    std::fs::write(
        &artifact_path,
        r#"{"feature_names": ["MURDER", "THEFT"], "centroids": [[-1, -1], [0, 0], [1, 1], [2, 2]]}"#,
    )
    .unwrap();
    std::fs::write(&reference_path, "MURDER,THEFT\n0,0\n2,4\n1,2\n").unwrap();

    let config = ModelConfig {
        artifact_path: artifact_path.to_string_lossy().into_owned(),
        reference_data_path: Some(reference_path.to_string_lossy().into_owned()),
        alignment: AlignmentPolicy::Lenient,
    };
    let state = build_state(&config);
    std::fs::remove_file(&artifact_path).ok();
    std::fs::remove_file(&reference_path).ok();

    let state = state.unwrap();
    assert_eq!(state.context.dimension(), 2);
    assert_eq!(state.context.normalizer().params().mean, vec![1.0, 2.0]);
    let summary = state.summary.unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(state.records.unwrap().len(), 3);
}

#[test]
fn test_build_state_missing_artifact() {
    let config = ModelConfig {
        artifact_path: "/nonexistent/crime_clusters.json".to_string(),
        reference_data_path: None,
        alignment: AlignmentPolicy::Lenient,
    };
    assert!(build_state(&config).is_err());
}
