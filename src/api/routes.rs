//! API Routes
//!
//! Configures the Axum router with all hash cache endpoints.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_field_handler, delete_group_handler, health_handler, read_field_handler,
    read_group_handler, stats_handler, write_field_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /hash/:prefix/:key` - Write a field
/// - `GET /hash/:prefix/:key` - Read a field
/// - `DELETE /hash/:prefix/:key` - Delete a field
/// - `GET /hash/:prefix` - Read every live field of a group
/// - `DELETE /hash/:prefix` - Delete a whole group
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/hash/:prefix/:key",
            put(write_field_handler)
                .get(read_field_handler)
                .delete(delete_field_handler),
        )
        .route(
            "/hash/:prefix",
            get(read_group_handler).delete(delete_group_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
