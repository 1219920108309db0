//! The `/api/tutor` feedback endpoint.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{instrument, warn};

use tutor_core::feedback::{FeedbackRequest, FeedbackResponse};

use crate::app::AppState;
use crate::response::ApiError;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the routes mounted under `/api`.
pub fn tutor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tutor",
            post(request_feedback).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// POST /api/tutor
///
/// Body: `{ "fieldKey": string, "promptContext": string, "studentAnswer": string }`.
/// The body is read raw so that an empty body counts as `{}` and parse
/// failures come back as JSON like every other error.
///
/// ### Responses
/// - `200 OK` → `{ "text": "..." }`
/// - `400 Bad Request` → answer missing or shorter than 5 characters, or bad JSON
/// - `413 Payload Too Large` → body over [`MAX_BODY_BYTES`]
/// - `405 Method Not Allowed` → any method but POST
/// - `500 Internal Server Error` → missing credential or provider failure
#[instrument(skip_all)]
async fn request_feedback(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let body = body.map_err(body_error)?;
    let request = FeedbackRequest::from_json_bytes(&body)?;
    let response = state.service.feedback(&request).await?;
    Ok(Json(response))
}

fn body_error(rejection: BytesRejection) -> ApiError {
    let status = rejection.status();
    warn!(%status, "request body rejected");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, "Request body is too large.")
    } else {
        ApiError::new(status, rejection.body_text())
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
