//! Integration tests for batch-job record storage and status transitions.

use atrium_core::{BatchJob, JobOutcome, JobRepository, JobStatus, JobType, ServiceError};
use atrium_db::Database;

fn make_job(job_type: JobType) -> BatchJob {
    BatchJob::new(job_type, serde_json::json!({"source": "test"}))
}

fn succeeded(generated_id: &str) -> JobOutcome {
    JobOutcome::Succeeded {
        output_ref: Some("artifact-1".to_string()),
        generated_id: Some(generated_id.to_string()),
        metadata: serde_json::json!({"nodes": 3}),
    }
}

#[tokio::test]
async fn test_create_then_find_pending() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::TopicTreeIngest);
    db.create(&job).await.unwrap();

    let found = db.find_by_id(&job.id).await.unwrap().expect("job exists");
    assert_eq!(found.id, job.id);
    assert_eq!(found.job_type, JobType::TopicTreeIngest);
    assert_eq!(found.status, JobStatus::Pending);
    assert_eq!(found.payload, serde_json::json!({"source": "test"}));
    assert!(found.error.is_none());
    assert!(found.started_at.is_none());
}

#[tokio::test]
async fn test_find_unknown_is_none() {
    let db = Database::new_in_memory().await.unwrap();
    assert!(db.find_by_id("no-such-job").await.unwrap().is_none());
}

#[tokio::test]
async fn test_mark_active_stamps_start_time() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::IrtTraining);
    db.create(&job).await.unwrap();

    db.mark_active(&job.id).await.unwrap();

    let found = db.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Active);
    assert!(found.started_at.is_some());
    assert!(found.finished_at.is_none());
}

#[tokio::test]
async fn test_mark_active_unknown_job_is_not_found() {
    let db = Database::new_in_memory().await.unwrap();
    let err = db.mark_active("ghost").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn test_finish_succeeded_writes_output() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::ZipStructureRebuild);
    db.create(&job).await.unwrap();
    db.mark_active(&job.id).await.unwrap();

    db.finish(&job.id, &succeeded("root-42")).await.unwrap();

    let found = db.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Succeeded);
    assert_eq!(found.output_ref.as_deref(), Some("artifact-1"));
    assert_eq!(found.generated_id.as_deref(), Some("root-42"));
    assert_eq!(found.metadata, serde_json::json!({"nodes": 3}));
    assert!(found.finished_at.is_some());
    assert!(found.error.is_none());
}

#[tokio::test]
async fn test_finish_failed_captures_error() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::DktTraining);
    db.create(&job).await.unwrap();
    db.mark_active(&job.id).await.unwrap();

    db.finish(
        &job.id,
        &JobOutcome::Failed {
            error: "ml endpoint returned 503".to_string(),
        },
    )
    .await
    .unwrap();

    let found = db.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Failed);
    assert_eq!(found.error.as_deref(), Some("ml endpoint returned 503"));
}

#[tokio::test]
async fn test_failed_job_never_becomes_succeeded() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::QueryEngineBuild);
    db.create(&job).await.unwrap();
    db.mark_active(&job.id).await.unwrap();
    db.finish(
        &job.id,
        &JobOutcome::Failed {
            error: "boom".to_string(),
        },
    )
    .await
    .unwrap();

    let err = db.finish(&job.id, &succeeded("nope")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err}");

    let found = db.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Failed);
    assert!(found.generated_id.is_none());
}

#[tokio::test]
async fn test_terminal_job_cannot_reactivate() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::TopicTreeIngest);
    db.create(&job).await.unwrap();
    db.mark_active(&job.id).await.unwrap();
    db.finish(&job.id, &succeeded("root-1")).await.unwrap();

    let err = db.mark_active(&job.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)), "{err}");
}

#[tokio::test]
async fn test_pending_job_may_fail_directly() {
    // Scheduling failure marks a job failed without it ever going active.
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::IrtTraining);
    db.create(&job).await.unwrap();

    db.finish(
        &job.id,
        &JobOutcome::Failed {
            error: "container runner rejected the execution".to_string(),
        },
    )
    .await
    .unwrap();

    let found = db.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.status, JobStatus::Failed);
}

#[tokio::test]
async fn test_delete_job() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::TopicTreeIngest);
    db.create(&job).await.unwrap();

    assert!(db.delete(&job.id).await.unwrap());
    assert!(db.find_by_id(&job.id).await.unwrap().is_none());
    // Second delete finds nothing.
    assert!(!db.delete(&job.id).await.unwrap());
}

#[tokio::test]
async fn test_artifact_round_trip() {
    let db = Database::new_in_memory().await.unwrap();
    let job = make_job(JobType::IrtTraining);
    db.create(&job).await.unwrap();

    let artifact_id = db
        .insert_artifact(
            &job.id,
            "irt",
            None,
            &serde_json::json!({"items": 12, "mean_difficulty": 0.3}),
        )
        .await
        .unwrap();

    let artifact = db.get_artifact(&artifact_id).await.unwrap().unwrap();
    assert_eq!(artifact.job_id, job.id);
    assert_eq!(artifact.kind, "irt");
    assert!(artifact.location.is_none());
    assert_eq!(artifact.stats["items"], 12);
}
