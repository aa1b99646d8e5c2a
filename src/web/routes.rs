//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        // Search routes
        .route("/search", post(handlers::search))
        .route("/search/tavily", post(handlers::search_tavily))
        .route("/search/serp", post(handlers::search_serp))
        .route("/search/batch", post(handlers::search_batch))
        // API routes
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        // Add middleware
        .layer(cors)
        // Add state
        .with_state(state)
}
