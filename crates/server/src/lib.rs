// crates/server/src/lib.rs
//! Atrium API server library.
//!
//! Axum-based HTTP front door for the platform: batch-job submission and
//! status, learning-object content, and the liveness probe, all speaking the
//! uniform `{success, message, data}` envelope.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::api_routes;
pub use state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (ping, jobs, objects)
/// - CORS for development (allows any origin)
/// - Request tracing
pub fn create_app(state: std::sync::Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
