use axum::Json;
use prodscore_core::meta;

use crate::response::DataResponse;

/// GET /api/v1/meta/departments
pub async fn list_departments() -> Json<DataResponse<Vec<&'static str>>> {
    Json(DataResponse {
        data: meta::departments(),
    })
}

/// GET /api/v1/meta/teams
pub async fn list_teams() -> Json<DataResponse<Vec<String>>> {
    Json(DataResponse {
        data: meta::teams(),
    })
}
