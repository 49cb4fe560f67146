//! Integration tests for `POST /api/v1/predict`.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, post_raw, valid_record};
use serde_json::json;

#[tokio::test]
async fn valid_record_is_scored_with_charts() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.85);

    let response = post_json(app, "/api/v1/predict", valid_record()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["actual_productivity"], 0.85);
    assert_eq!(data["category"], "High Productivity");

    let charts = data["visualizations"].as_object().unwrap();
    for key in ["bar_chart_url", "scatter_plot_url", "line_graph_url", "pie_chart_url"] {
        assert!(
            charts[key]
                .as_str()
                .unwrap()
                .starts_with("data:image/svg+xml;base64,"),
            "{key} is not an SVG data URL"
        );
    }
}

#[tokio::test]
async fn invalid_record_lists_every_violation() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let mut record = valid_record();
    record["department"] = json!("Packing");
    record["over_time_hours"] = json!(9);
    record.as_object_mut().unwrap().remove("worker_count");

    let response = post_json(app, "/api/v1/predict", record).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid input data");
    let details: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(details.contains(&"Invalid department"));
    assert!(details.contains(&"Overtime hours cannot exceed 8"));
    assert!(details.contains(&"Worker count is required"));
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let response = post_json(app, "/api/v1/predict", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No data provided");
}

#[tokio::test]
async fn zero_length_body_is_no_data_with_error_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let response = post_raw(app, "/api/v1/predict", Some("application/json"), "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No data provided");
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_gets_error_shape() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let response = post_raw(app, "/api/v1/predict", Some("application/json"), "not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn body_without_content_type_is_still_scored() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.85);

    let response = post_raw(app, "/api/v1/predict", None, valid_record().to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["category"], "High Productivity");
}

#[tokio::test]
async fn json_array_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let response = post_json(app, "/api/v1/predict", json!([1, 2])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No data provided");
}

#[tokio::test]
async fn body_over_limit_is_413_with_error_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::ready_app(dir.path(), 0.5);

    let padded = format!("{{\"notes\":\"{}\"}}", "x".repeat(2 * 1024 * 1024));
    let response = post_raw(app, "/api/v1/predict", Some("application/json"), padded).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn missing_model_is_503_even_for_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::degraded_app(dir.path());

    let response = post_json(app, "/api/v1/predict", json!({ "department": "Packing" })).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");
}
