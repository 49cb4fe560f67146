use axum::routing::post;
use axum::Router;

use crate::handlers::scoring;
use crate::state::AppState;

/// Single-record scoring routes, merged at the `/api/v1` root.
pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(scoring::predict))
}
