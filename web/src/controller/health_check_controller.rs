use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// GET liveness of the API along with the number of open WebSocket sessions
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = serde_json::Value),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    let sessions = app_state.ws_manager.session_count().await;

    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "sessions": sessions })),
    )
}
