pub mod batch;
pub mod health;
pub mod meta;
pub mod scoring;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /predict                      score one record (POST)
///
/// /batch                        upload a CSV batch (POST)
/// /batch/{id}                   job status (GET)
/// /batch/{id}/download          result artifact (GET)
///
/// /meta/departments             department pick list (GET)
/// /meta/teams                   team pick list (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(scoring::router())
        .nest("/batch", batch::router())
        .nest("/meta", meta::router())
}
