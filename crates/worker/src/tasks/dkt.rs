// crates/worker/src/tasks/dkt.rs
// Delegate knowledge-tracing training to the external ML endpoint.
//
// The worker forwards the job payload as-is; the endpoint owns the actual
// model fitting and hands back the location of the trained artifact.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use atrium_core::{AppConfig, BatchJob};
use atrium_db::Database;

use super::{TaskError, TaskOutput};

#[derive(Debug, Deserialize)]
struct TrainResponse {
    artifact_uri: String,
    #[serde(default)]
    metrics: serde_json::Value,
}

pub async fn run(
    db: &Database,
    config: &AppConfig,
    job: &BatchJob,
) -> Result<TaskOutput, TaskError> {
    let url = format!(
        "{}/v1/dkt/train",
        config.ml_endpoint_url.trim_end_matches('/')
    );
    let client = reqwest::Client::new();
    let response = client.post(&url).json(&job.payload).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(TaskError::Upstream { status, body });
    }
    let trained: TrainResponse = response.json().await?;

    let stats = json!({
        "artifact_uri": trained.artifact_uri,
        "metrics": trained.metrics,
    });
    let artifact_id = db
        .insert_artifact(&job.id, "dkt", Some(&trained.artifact_uri), &stats)
        .await?;

    info!(artifact_id = %artifact_id, artifact_uri = %trained.artifact_uri, "dkt training complete");
    Ok(TaskOutput {
        output_ref: Some(artifact_id),
        generated_id: None,
        metadata: json!({ "artifact_uri": trained.artifact_uri }),
    })
}
