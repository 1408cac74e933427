//! HTTP API for the chunking service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;

/// Build the service router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Synchronous chunking
        .route("/chunks", post(handlers::chunk_document))
        // Chunking jobs
        .route("/chunk/jobs", post(handlers::start_chunk_job))
        .route("/chunk/jobs/:job_id", get(handlers::get_job_status))
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
