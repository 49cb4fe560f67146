//! Handler for the single-record scoring path.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use prodscore_core::prediction::{predict as run_prediction, SinglePrediction};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/predict
///
/// Validate one record, score it and render its charts. Validation failures
/// come back as 400 with every violated rule listed under `details`.
///
/// The body is parsed by hand, so empty, malformed and oversized payloads
/// still answer with `{error, code}`. The content type is not checked.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<DataResponse<SinglePrediction>>> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })?;
    let raw = match parse_body(&body)? {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(no_data()),
    };

    // Tree walking and chart rendering are CPU-bound.
    let model = state.model.clone();
    let visualizer = Arc::clone(&state.visualizer);
    let prediction =
        tokio::task::spawn_blocking(move || run_prediction(&model, visualizer.as_ref(), &raw))
            .await
            .map_err(|e| AppError::InternalError(format!("Prediction task failed: {e}")))??;

    tracing::debug!(
        score = prediction.result.score,
        category = prediction.result.category.label(),
        "Record scored",
    );

    Ok(Json(DataResponse { data: prediction }))
}

fn no_data() -> AppError {
    AppError::BadRequest("No data provided".to_string())
}

fn parse_body(body: &[u8]) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(no_data());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}
