// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use atrium_core::{AppConfig, ContentRepository, JobRepository};
use atrium_db::Database;
use atrium_runner::JobLauncher;

/// Shared application state accessible from all route handlers.
///
/// Handlers see the repository ports and the launcher seam, not the concrete
/// database or HTTP client. The configuration object is built once in `main`
/// and lives here for the life of the process.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Process configuration, constructed once at startup.
    pub config: AppConfig,
    /// Batch-job records.
    pub jobs: Arc<dyn JobRepository>,
    /// Learning-object storage.
    pub content: Arc<dyn ContentRepository>,
    /// Container runner seam.
    pub launcher: Arc<dyn JobLauncher>,
}

impl AppState {
    /// Create application state wrapped in an Arc for sharing.
    pub fn new(db: Database, launcher: Arc<dyn JobLauncher>, config: AppConfig) -> Arc<Self> {
        let db = Arc::new(db);
        Arc::new(Self {
            start_time: Instant::now(),
            config,
            jobs: db.clone(),
            content: db,
            launcher,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
