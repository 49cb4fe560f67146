use axum::routing::get;
use axum::Router;

use crate::handlers::meta;
use crate::state::AppState;

/// Routes mounted at `/meta`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/departments", get(meta::list_departments))
        .route("/teams", get(meta::list_teams))
}
