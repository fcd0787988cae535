// crates/worker/src/lib.rs
//! Atrium batch worker library.
//!
//! The worker runs inside the container the runner spawned for one job: it
//! loads the record by id, marks it active, executes the job-type-specific
//! task, and writes exactly one terminal state. After the record is
//! terminal it asks the runner to delete its own execution resource;
//! failure there is logged and not retried.

pub mod tasks;

use thiserror::Error;
use tracing::{error, info, warn};

use atrium_core::{AppConfig, JobOutcome, JobRepository, JobStatus, ServiceError};
use atrium_db::Database;
use atrium_runner::{resource_name, JobLauncher};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("job {0} not found")]
    UnknownJob(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Execute one job to a terminal state.
///
/// Task failures are captured into the record as `failed`; only
/// infrastructure problems (unknown id, storage faults, a record that is
/// already terminal) surface as `Err`. By construction this is the only
/// process writing the record after creation, so a conflict here means the
/// invocation itself is a duplicate.
pub async fn run_job(
    db: &Database,
    launcher: &dyn JobLauncher,
    config: &AppConfig,
    job_id: &str,
) -> Result<JobStatus, WorkerError> {
    let job = db
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| WorkerError::UnknownJob(job_id.to_string()))?;

    db.mark_active(job_id).await?;
    info!(job_id, job_type = %job.job_type, "job active");

    let outcome = match tasks::run_task(db, config, &job).await {
        Ok(output) => {
            info!(job_id, "task completed");
            JobOutcome::Succeeded {
                output_ref: output.output_ref,
                generated_id: output.generated_id,
                metadata: output.metadata,
            }
        }
        Err(e) => {
            error!(job_id, error = %e, "task failed");
            JobOutcome::Failed {
                error: e.to_string(),
            }
        }
    };
    let status = outcome.status();
    db.finish(job_id, &outcome).await?;

    // Self-cleanup of the execution resource, best-effort.
    if let Err(e) = launcher.delete(&resource_name(job_id)).await {
        warn!(job_id, error = %e, "failed to delete own execution resource");
    }

    Ok(status)
}
