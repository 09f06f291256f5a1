use axum::extract::State;
use axum::Json;
use keyshop_core::Category;

use crate::error::ApiResult;
use crate::SharedState;

/// `GET /api/categories`: every category, for the filter controls.
pub async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list_all().await?))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get_json, seeded_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_categories() {
        let (app, _db) = seeded_app().await;
        let (status, body) = get_json(&app, "/api/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"id": 1, "name": "Keycaps"}, {"id": 2, "name": "Cables"}])
        );
    }
}
