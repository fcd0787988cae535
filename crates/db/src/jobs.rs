// crates/db/src/jobs.rs
// Batch-job records: creation, status transitions, and model artifacts.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use atrium_core::{BatchJob, JobOutcome, JobRepository, JobStatus, JobType, ServiceError, ServiceResult};

use crate::{Database, DbError, DbResult};

/// Internal row type for the `jobs` table.
#[derive(Debug)]
struct JobRow {
    id: String,
    job_type: String,
    status: String,
    payload: String,
    output_ref: Option<String>,
    generated_id: Option<String>,
    error: Option<String>,
    metadata: String,
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for JobRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            job_type: row.try_get("job_type")?,
            status: row.try_get("status")?,
            payload: row.try_get("payload")?,
            output_ref: row.try_get("output_ref")?,
            generated_id: row.try_get("generated_id")?,
            error: row.try_get("error")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            started_at: row.try_get("started_at")?,
            finished_at: row.try_get("finished_at")?,
        })
    }
}

impl JobRow {
    fn into_batch_job(self) -> DbResult<BatchJob> {
        let job_type: JobType = self.job_type.parse().map_err(|_| DbError::CorruptRow {
            table: "jobs",
            id: self.id.clone(),
            message: format!("unknown job_type {}", self.job_type),
        })?;
        let payload =
            serde_json::from_str(&self.payload).map_err(|e| DbError::CorruptRow {
                table: "jobs",
                id: self.id.clone(),
                message: format!("payload: {e}"),
            })?;
        let metadata =
            serde_json::from_str(&self.metadata).map_err(|e| DbError::CorruptRow {
                table: "jobs",
                id: self.id.clone(),
                message: format!("metadata: {e}"),
            })?;
        Ok(BatchJob {
            status: JobStatus::from_db_str(&self.status),
            id: self.id,
            job_type,
            payload,
            output_ref: self.output_ref,
            generated_id: self.generated_id,
            error: self.error,
            metadata,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
        })
    }
}

impl Database {
    async fn fetch_job(&self, id: &str) -> DbResult<Option<BatchJob>> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.map(JobRow::into_batch_job).transpose()
    }

    /// Not-found when the job is missing, conflict when it is terminal.
    async fn explain_zero_rows(&self, id: &str, action: &str) -> ServiceError {
        match self.fetch_job(id).await {
            Ok(Some(job)) => ServiceError::Conflict(format!(
                "job {id} is {}, cannot {action}",
                job.status
            )),
            Ok(None) => ServiceError::not_found("job", id),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl JobRepository for Database {
    async fn create(&self, job: &BatchJob) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, job_type, status, payload, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&job.id)
        .bind(job.job_type.as_str())
        .bind(job.status.as_str())
        .bind(job.payload.to_string())
        .bind(job.metadata.to_string())
        .bind(job.created_at)
        .execute(self.pool())
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> ServiceResult<Option<BatchJob>> {
        Ok(self.fetch_job(id).await?)
    }

    async fn mark_active(&self, id: &str) -> ServiceResult<()> {
        let started_at = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'active', started_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(started_at)
        .execute(self.pool())
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(self.explain_zero_rows(id, "activate").await);
        }
        Ok(())
    }

    async fn finish(&self, id: &str, outcome: &JobOutcome) -> ServiceResult<()> {
        let finished_at = Utc::now().timestamp();
        // The status guard is the SQL half of the one-directional state
        // machine: a row already in a terminal state matches zero rows.
        let result = match outcome {
            JobOutcome::Succeeded {
                output_ref,
                generated_id,
                metadata,
            } => {
                sqlx::query(
                    r#"
                    UPDATE jobs SET
                        status = 'succeeded',
                        output_ref = ?2,
                        generated_id = ?3,
                        metadata = ?4,
                        finished_at = ?5
                    WHERE id = ?1 AND status IN ('pending', 'active')
                    "#,
                )
                .bind(id)
                .bind(output_ref)
                .bind(generated_id)
                .bind(metadata.to_string())
                .bind(finished_at)
                .execute(self.pool())
                .await
            }
            JobOutcome::Failed { error } => {
                sqlx::query(
                    r#"
                    UPDATE jobs SET
                        status = 'failed',
                        error = ?2,
                        finished_at = ?3
                    WHERE id = ?1 AND status IN ('pending', 'active')
                    "#,
                )
                .bind(id)
                .bind(error)
                .bind(finished_at)
                .execute(self.pool())
                .await
            }
        }
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(self.explain_zero_rows(id, "finish").await);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> ServiceResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected() > 0)
    }
}

/// One stored model artifact produced by a training job.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub id: String,
    pub job_id: String,
    pub kind: String,
    pub location: Option<String>,
    pub stats: serde_json::Value,
    pub created_at: i64,
}

impl Database {
    /// Record a model artifact and return its id.
    pub async fn insert_artifact(
        &self,
        job_id: &str,
        kind: &str,
        location: Option<&str>,
        stats: &serde_json::Value,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO model_artifacts (id, job_id, kind, location, stats, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(job_id)
        .bind(kind)
        .bind(location)
        .bind(stats.to_string())
        .bind(Utc::now().timestamp())
        .execute(self.pool())
        .await?;
        Ok(id)
    }

    /// Read an artifact back by id.
    pub async fn get_artifact(&self, id: &str) -> DbResult<Option<ModelArtifact>> {
        let row = sqlx::query("SELECT * FROM model_artifacts WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        let Some(row) = row else { return Ok(None) };
        let stats_raw: String = row.try_get("stats").map_err(DbError::from)?;
        Ok(Some(ModelArtifact {
            id: row.try_get("id").map_err(DbError::from)?,
            job_id: row.try_get("job_id").map_err(DbError::from)?,
            kind: row.try_get("kind").map_err(DbError::from)?,
            location: row.try_get("location").map_err(DbError::from)?,
            stats: serde_json::from_str(&stats_raw).unwrap_or(serde_json::Value::Null),
            created_at: row.try_get("created_at").map_err(DbError::from)?,
        }))
    }
}
