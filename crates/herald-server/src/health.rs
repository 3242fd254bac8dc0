//! Liveness endpoint.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// `GET /health` answers `200 ok`; every other path falls through to 404.
#[must_use]
pub fn health_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}
