#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use prodscore_core::error::CoreError;
use prodscore_core::features::FeatureVector;
use prodscore_core::scoring::{ModelHandle, Scorer};
use prodscore_core::visualization::SvgChartRenderer;
use prodscore_pipeline::{BatchJobManager, CsvResultSink, CsvSource, JobRegistry, ManagerConfig};
use tower::ServiceExt;

use prodscore_api::config::ServerConfig;
use prodscore_api::router::build_app_router;
use prodscore_api::state::AppState;

/// Scorer that always answers the same value.
pub struct FixedScorer(pub f64);

impl Scorer for FixedScorer {
    fn score(&self, _: &FeatureVector) -> Result<f64, CoreError> {
        Ok(self.0)
    }
}

/// Build a test `ServerConfig` whose upload and results directories live
/// under `root`.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        model_path: root.join("model_rf.json"),
        upload_dir: root.join("uploads"),
        results_dir: root.join("results"),
        max_concurrent_jobs: 2,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Build the full application router with the production middleware stack
/// around the given model.
pub fn build_test_app(root: &Path, model: ModelHandle) -> Router {
    let config = test_config(root);
    let jobs = BatchJobManager::new(
        Arc::new(JobRegistry::new()),
        model.clone(),
        Arc::new(CsvSource),
        Arc::new(CsvResultSink::new(config.results_dir.clone())),
        ManagerConfig {
            max_concurrent_jobs: config.max_concurrent_jobs,
        },
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        model,
        visualizer: Arc::new(SvgChartRenderer),
        jobs,
    };
    build_app_router(state, &config)
}

/// A router whose model always scores `score`.
pub fn ready_app(root: &Path, score: f64) -> Router {
    build_test_app(root, ModelHandle::ready(FixedScorer(score)))
}

/// A router running without a model.
pub fn degraded_app(root: &Path) -> Router {
    build_test_app(root, ModelHandle::unavailable("model file missing"))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST an arbitrary body, optionally with a content type.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body.into()).unwrap()).await.unwrap()
}

pub const BOUNDARY: &str = "prodscore-test-boundary";

/// Encode one multipart part. `file_name` of `None` sends a plain field.
pub fn multipart_part(field: &str, file_name: Option<&str>, contents: &str) -> String {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n"
    )
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[String]) -> Response<Body> {
    let mut body = parts.concat();
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Poll the status endpoint until the job leaves `queued` / `processing`.
pub async fn wait_for_batch(app: &Router, id: &str) -> serde_json::Value {
    for _ in 0..500 {
        let response = get(app.clone(), &format!("/api/v1/batch/{id}")).await;
        let json = body_json(response).await;
        let status = json["data"]["status"].as_str().unwrap_or_default().to_string();
        if status == "completed" || status == "failed" {
            return json["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("batch {id} did not finish in time");
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn valid_record() -> serde_json::Value {
    serde_json::json!({
        "date": "2023-05-15",
        "department": "Sewing",
        "team": "Team 3",
        "targeted_productivity": 75,
        "smv_minutes": 2.5,
        "over_time_hours": 1.5,
        "incentive_level": "Standard",
        "idle_time_minutes": 30,
        "idle_men_count": 1,
        "style_change_count": 2,
        "worker_count": 50
    })
}

pub const CSV_HEADER: &str = "date,department,team,targeted_productivity,smv_minutes,over_time_hours,incentive_level,idle_time_minutes,idle_men_count,style_change_count,worker_count";

pub fn csv_with_departments(departments: &[&str]) -> String {
    let mut out = format!("{CSV_HEADER}\n");
    for d in departments {
        out.push_str(&format!("2023-05-15,{d},Team 3,75,2.5,1,Standard,30,1,2,50\n"));
    }
    out
}
