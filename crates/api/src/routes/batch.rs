use axum::routing::{get, post};
use axum::Router;

use crate::handlers::batch;
use crate::state::AppState;

/// Routes mounted at `/batch`.
///
/// ```text
/// POST   /                  create_batch
/// GET    /{id}              get_batch_status
/// GET    /{id}/download     download_batch_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(batch::create_batch))
        .route("/{id}", get(batch::get_batch_status))
        .route("/{id}/download", get(batch::download_batch_result))
}
