use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use prodscore_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `prodscore_core` or the batch pipeline.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body is larger than the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(details) => {
                    let body = json!({
                        "error": "Invalid input data",
                        "code": core.code(),
                        "details": details,
                    });
                    return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
                }
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    core.code(),
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::MissingArtifact(msg) => {
                    (StatusCode::NOT_FOUND, core.code(), msg.clone())
                }
                CoreError::NotReady(msg) => (StatusCode::CONFLICT, core.code(), msg.clone()),
                CoreError::ServiceUnavailable(msg) => {
                    (StatusCode::SERVICE_UNAVAILABLE, core.code(), msg.clone())
                }
                CoreError::Prediction(msg) => {
                    tracing::error!(error = %msg, "Prediction failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        core.code(),
                        "Prediction failed".to_string(),
                    )
                }
                CoreError::SourceRead(_) | CoreError::Persistence(_) | CoreError::Internal(_) => {
                    tracing::error!(error = %core, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        core.code(),
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
