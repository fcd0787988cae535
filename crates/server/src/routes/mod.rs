// crates/server/src/routes/mod.rs
//! API route handlers for the atrium server.

pub mod jobs;
pub mod objects;
pub mod ping;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - GET    /ping                     - Liveness probe
/// - POST   /api/v1/jobs              - Submit a batch job
/// - GET    /api/v1/jobs/{id}         - Job status lookup
/// - DELETE /api/v1/jobs/{id}         - Administrative job delete
/// - POST   /api/v1/objects           - Create a learning object
/// - GET    /api/v1/objects/{id}      - Fetch a learning object
/// - PUT    /api/v1/objects/{id}      - Update a learning object
/// - DELETE /api/v1/objects/{id}      - Soft-delete an object subtree
/// - GET    /api/v1/objects/{id}/tree - Fetch an object subtree
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(ping::router())
        .nest(
            "/api/v1",
            Router::new().merge(jobs::router()).merge(objects::router()),
        )
        .with_state(state)
}
