//! Router assembly and shared state.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tutor_core::feedback::TutorService;

use crate::routes::{health::health_routes, tutor::tutor_routes};

/// State shared by every request. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: TutorService,
}

impl AppState {
    pub fn new(service: TutorService) -> Self {
        Self { service }
    }
}

/// Build the application router.
///
/// - `/health` → liveness probe
/// - `/api/tutor` → feedback endpoint
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/api", tutor_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
