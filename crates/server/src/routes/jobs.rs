// crates/server/src/routes/jobs.rs
//! API routes for batch-job submission and status.
//!
//! - POST   /jobs      - Submit a batch job to the container runner
//! - GET    /jobs/{id} - Status lookup
//! - DELETE /jobs/{id} - Administrative delete (bearer token)
//!
//! There is no liveness check for jobs stuck in `active` (a crashed
//! container leaves its record that way); operators clean those up with the
//! delete route and resubmit.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use atrium_core::{BatchJob, Envelope, JobOutcome, JobType, ServiceError};
use atrium_runner::resource_name;

use crate::auth::authorize_admin;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/v1/jobs.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub job_type: String,
    #[serde(default = "empty_object")]
    pub payload: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// Response payload for a submitted job.
#[derive(Debug, Serialize)]
pub struct SubmitJobData {
    pub job_name: String,
    pub status: &'static str,
}

/// POST /api/v1/jobs - validate, record, and schedule a batch job.
async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitJobRequest>,
) -> ApiResult<Json<Envelope<SubmitJobData>>> {
    let job_type: JobType = req
        .job_type
        .parse()
        .map_err(|e: atrium_core::job::UnknownJobType| ServiceError::Validation(e.to_string()))?;

    let size = req.payload.to_string().len();
    let limit = state.config.max_payload_bytes;
    if size > limit {
        return Err(ServiceError::PayloadTooLarge { size, limit }.into());
    }

    let job = BatchJob::new(job_type, req.payload);
    state.jobs.create(&job).await?;

    match state.launcher.start(&job.id, job_type.as_str()).await {
        Ok(resource) => {
            tracing::info!(job_id = %job.id, job_type = %job_type, resource = %resource, "batch job scheduled");
            Ok(Json(Envelope::ok(
                "job submitted",
                SubmitJobData {
                    job_name: job.id,
                    status: "active",
                },
            )))
        }
        Err(e) => {
            // Scheduling failure is terminal for the record: the caller gets
            // a 500 and the row reads failed, never a pending row that no
            // container will ever pick up.
            tracing::error!(job_id = %job.id, error = %e, "container scheduling failed");
            let outcome = JobOutcome::Failed {
                error: format!("scheduling failed: {e}"),
            };
            if let Err(mark_err) = state.jobs.finish(&job.id, &outcome).await {
                tracing::error!(job_id = %job.id, error = %mark_err, "failed to record scheduling failure");
            }
            Err(ServiceError::Internal(format!("failed to schedule job: {e}")).into())
        }
    }
}

/// GET /api/v1/jobs/{id} - read-only status lookup.
async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<BatchJob>>> {
    let job = state
        .jobs
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ServiceError::not_found("job", &id))?;
    Ok(Json(Envelope::ok("job status", job)))
}

/// DELETE /api/v1/jobs/{id} - irreversible administrative cleanup.
async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<()>>> {
    authorize_admin(&state.config, &headers)?;

    // The orchestration resource goes first, best-effort.
    if let Err(e) = state.launcher.delete(&resource_name(&id)).await {
        tracing::warn!(job_id = %id, error = %e, "failed to delete execution resource");
    }

    if !state.jobs.delete(&id).await? {
        return Err(ServiceError::not_found("job", &id).into());
    }
    tracing::info!(job_id = %id, "job deleted");
    Ok(Json(Envelope::ok_empty("job deleted")))
}

/// Build the jobs router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/{id}", get(get_job).delete(delete_job))
}
