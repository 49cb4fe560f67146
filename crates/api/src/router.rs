//! HTTP surface of the scoring service.
//!
//! `main.rs` and the integration tests both go through [`build_app_router`],
//! so tests exercise the same layers that production serves.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header that correlates a response with its log lines.
const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Browsers may cache a preflight answer for an hour.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Assemble `/health`, the `/api/v1` scoring and batch routes, and the
/// middleware around them.
///
/// Reading outermost first, a request meets CORS, gets an `x-request-id`,
/// is traced, has the id copied onto its response, runs under the request
/// timeout and panic guard, and finally sees a body capped at
/// `MAX_UPLOAD_BYTES` (413 beyond that).
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    );
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CatchPanicLayer::new())
        .layer(timeout)
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(trace)
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// Cross-origin policy for the configured front-end origins.
///
/// Only GET and POST are needed; `Content-Disposition` is exposed so the
/// browser can name downloaded result files. An origin that does not parse
/// aborts startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("CORS_ORIGINS entry '{origin}' is not a valid origin: {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(PREFLIGHT_MAX_AGE)
}
