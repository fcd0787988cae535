// crates/core/src/ports.rs
//! Repository ports.
//!
//! Domain and route code depend on these narrow capability sets; the db
//! crate implements them once against SQLite. Single-record operations are
//! atomic at the storage layer, which is what the job status machine relies
//! on: after creation exactly one process (the spawned worker) writes a
//! given job, so no further mutual exclusion is needed.

use async_trait::async_trait;

use crate::content::{LearningObject, ObjectPatch};
use crate::error::ServiceResult;
use crate::job::{BatchJob, JobOutcome};

/// Persistence port for batch-job records.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a freshly created `pending` record.
    async fn create(&self, job: &BatchJob) -> ServiceResult<()>;

    /// Read a record by id; `None` when unknown.
    async fn find_by_id(&self, id: &str) -> ServiceResult<Option<BatchJob>>;

    /// Move `pending -> active` and stamp the start time.
    ///
    /// Conflict when the record is already terminal.
    async fn mark_active(&self, id: &str) -> ServiceResult<()>;

    /// Write the terminal outcome. Conflict when the record is already
    /// terminal: a failed job can never later read succeeded.
    async fn finish(&self, id: &str, outcome: &JobOutcome) -> ServiceResult<()>;

    /// Remove the record outright (administrative cleanup). Returns whether
    /// a record existed.
    async fn delete(&self, id: &str) -> ServiceResult<bool>;
}

/// Persistence port for learning objects: find_by_id, save, update,
/// soft_delete, and a children query.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Read a live object by id; soft-deleted and unknown ids both read as
    /// `None`.
    async fn find_by_id(&self, id: &str) -> ServiceResult<Option<LearningObject>>;

    /// Insert a new object.
    async fn save(&self, object: &LearningObject) -> ServiceResult<()>;

    /// Apply a patch and bump the version. Not-found when the object is
    /// missing or soft-deleted; returns the updated row.
    async fn update(&self, id: &str, patch: &ObjectPatch) -> ServiceResult<LearningObject>;

    /// Soft-delete the object and its whole subtree. Returns the number of
    /// rows marked.
    async fn soft_delete(&self, id: &str) -> ServiceResult<u64>;

    /// Live children of `parent_id`, or root objects when `None`.
    async fn children(&self, parent_id: Option<&str>) -> ServiceResult<Vec<LearningObject>>;
}
