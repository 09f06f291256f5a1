//! Health check for load balancers and monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::SharedState;

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn check(State(state): State<SharedState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get_json, seeded_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_ok_then_unavailable() {
        let (app, db) = seeded_app().await;

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        db.close().await;
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}
