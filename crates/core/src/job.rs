// crates/core/src/job.rs
//! Batch-job record and status machine.
//!
//! A `BatchJob` decouples a slow operation (content ingestion, model
//! training, archive processing) from the synchronous request cycle. The API
//! server creates the record and asks the container runner to start a worker
//! with the job id as argument; from that point the worker process is the
//! only writer. Status moves one way: `pending`/`active` into exactly one of
//! the terminal states, never back out.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of batch operations the platform runs out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Materialize a topic-tree payload as learning-object rows.
    TopicTreeIngest,
    /// Rebuild the derived content_index lookup table.
    QueryEngineBuild,
    /// Rebuild a content tree from an archive manifest.
    ZipStructureRebuild,
    /// Fit per-item difficulty and roll abilities up the hierarchy.
    IrtTraining,
    /// Delegate knowledge-tracing training to the ML endpoint.
    DktTraining,
}

impl JobType {
    /// All known job types, in wire order.
    pub const ALL: [JobType; 5] = [
        JobType::TopicTreeIngest,
        JobType::QueryEngineBuild,
        JobType::ZipStructureRebuild,
        JobType::IrtTraining,
        JobType::DktTraining,
    ];

    /// Wire/database representation of this job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::TopicTreeIngest => "topic_tree_ingest",
            JobType::QueryEngineBuild => "query_engine_build",
            JobType::ZipStructureRebuild => "zip_structure_rebuild",
            JobType::IrtTraining => "irt_training",
            JobType::DktTraining => "dkt_training",
        }
    }
}

impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownJobType(s.to_string()))
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a job-type string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job type: {0}")]
pub struct UnknownJobType(pub String);

/// Lifecycle status of a batch job.
///
/// `Pending`: record created, container not yet picked up the job.
/// `Active`: the worker container loaded the record and is executing.
/// `Succeeded` / `Failed`: terminal; nothing transitions out of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Active,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Active => "active",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse the database representation. Unknown strings read as `Failed`
    /// so a corrupted row can never be mistaken for runnable work.
    pub fn from_db_str(s: &str) -> JobStatus {
        match s {
            "pending" => JobStatus::Pending,
            "active" => JobStatus::Active,
            "succeeded" => JobStatus::Succeeded,
            _ => JobStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Whether the one-directional status machine permits `self -> next`.
    ///
    /// Legal moves: `pending -> active`, and `pending`/`active` into either
    /// terminal state. Everything else, including any move out of a terminal
    /// state, is rejected.
    pub fn can_transition(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Active) => true,
            (JobStatus::Pending | JobStatus::Active, JobStatus::Succeeded | JobStatus::Failed) => {
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result a worker records for a job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Succeeded {
        /// Location of produced output (artifact row id, object-store URI).
        output_ref: Option<String>,
        /// Id of an item the job generated (e.g. the ingested tree root).
        generated_id: Option<String>,
        /// Free-form result fields surfaced on status lookup.
        metadata: serde_json::Value,
    },
    Failed {
        /// Captured error message for the status endpoint.
        error: String,
    },
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Succeeded { .. } => JobStatus::Succeeded,
            JobOutcome::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// One asynchronous unit of work submitted to the container runner.
#[derive(Debug, Clone, Serialize)]
pub struct BatchJob {
    pub id: String,
    pub job_type: JobType,
    pub status: JobStatus,
    /// Opaque serialized request body the worker interprets per job type.
    pub payload: serde_json::Value,
    pub output_ref: Option<String>,
    pub generated_id: Option<String>,
    /// Present only when status is `failed`.
    pub error: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
}

impl BatchJob {
    /// Create a fresh `pending` record with a v4 UUID id.
    pub fn new(job_type: JobType, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type,
            status: JobStatus::Pending,
            payload,
            output_ref: None,
            generated_id: None,
            error: None,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: Utc::now().timestamp(),
            started_at: None,
            finished_at: None,
        }
    }
}
