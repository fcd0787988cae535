// crates/runner/src/lib.rs
//! Client for the container runner that executes batch jobs.
//!
//! The runner is an external orchestration API: the server asks it to start
//! one container per submitted job (the job id is the container argument),
//! and the worker asks it to delete its own execution resource once the job
//! reaches a terminal state. `JobLauncher` is the seam; `HttpJobLauncher`
//! talks to the real API and `RecordingLauncher` stands in for tests.

mod http;
mod recording;

pub use http::HttpJobLauncher;
pub use recording::RecordingLauncher;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("runner transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("runner rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Deterministic execution resource name for a job id.
///
/// Submission and the worker's self-cleanup derive the same name from the
/// job id instead of passing orchestration state through the job record.
pub fn resource_name(job_id: &str) -> String {
    format!("atrium-job-{job_id}")
}

/// Seam to the container orchestration API.
#[async_trait]
pub trait JobLauncher: Send + Sync {
    /// Start a container for the job. Returns the execution resource name.
    async fn start(&self, job_id: &str, job_type: &str) -> Result<String, LaunchError>;

    /// Delete an execution resource. An already-gone resource is success.
    async fn delete(&self, resource: &str) -> Result<(), LaunchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_is_deterministic() {
        assert_eq!(resource_name("j-1"), "atrium-job-j-1");
        assert_eq!(resource_name("j-1"), resource_name("j-1"));
    }
}
