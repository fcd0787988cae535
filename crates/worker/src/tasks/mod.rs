// crates/worker/src/tasks/mod.rs
//! Job-type-specific task logic.
//!
//! Each task takes the job's opaque payload, works against storage or an
//! external service, and returns what the record should carry on success.
//! Errors become the job's `failed` error detail; nothing in here retries.

mod dkt;
mod irt;
mod query_engine;
mod topic_tree;
mod zip_structure;

use thiserror::Error;

use atrium_core::{AppConfig, BatchJob, JobType, ServiceError};
use atrium_db::{Database, DbError};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid payload: {0}")]
    Payload(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("ml endpoint transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ml endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// What a successful task hands back for the job record.
#[derive(Debug, Default)]
pub struct TaskOutput {
    pub output_ref: Option<String>,
    pub generated_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// Dispatch a job to its task implementation.
pub async fn run_task(
    db: &Database,
    config: &AppConfig,
    job: &BatchJob,
) -> Result<TaskOutput, TaskError> {
    match job.job_type {
        JobType::TopicTreeIngest => topic_tree::run(db, &job.payload).await,
        JobType::QueryEngineBuild => query_engine::run(db).await,
        JobType::ZipStructureRebuild => zip_structure::run(db, &job.payload).await,
        JobType::IrtTraining => irt::run(db, job).await,
        JobType::DktTraining => dkt::run(db, config, job).await,
    }
}
