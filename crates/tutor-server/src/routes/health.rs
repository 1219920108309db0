use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::app::AppState;

/// Builds the `/health` route group.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// ```json
/// { "status": "ok", "provider": "openai" }
/// ```
///
/// `provider` is `"unconfigured"` when no credential was found at startup;
/// the process is still healthy and answers feedback requests with a 500.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "provider": state.service.provider_name(),
    }))
}
