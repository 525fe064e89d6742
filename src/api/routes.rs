//! HTTP API route definitions.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{fallback, health, set_events, status, AppState};

/// Largest accepted push body.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Create the API router.
///
/// Unknown paths and wrong methods on known paths both land on [`fallback`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health).fallback(fallback))
        // Status endpoint
        .route("/api/v1/status", get(status).fallback(fallback))
        // Push mode
        .route("/api/setevents", post(set_events).fallback(fallback))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
