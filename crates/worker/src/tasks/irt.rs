// crates/worker/src/tasks/irt.rs
// Fit per-item difficulty from response tallies and roll abilities up the
// content hierarchy.
//
// Difficulty is the log-odds of an incorrect response with a +0.5
// continuity correction, so an item everyone gets right goes strongly
// negative and an item everyone misses goes strongly positive. Ability per
// item is the plain fraction correct; ancestors get the level-by-level mean.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use atrium_core::{roll_up_scores, BatchJob};
use atrium_db::Database;

use super::{TaskError, TaskOutput};

#[derive(Debug, Deserialize)]
struct ResponseTally {
    item_id: String,
    correct: u64,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct IrtPayload {
    responses: Vec<ResponseTally>,
}

fn difficulty(correct: u64, total: u64) -> f64 {
    let wrong = (total - correct) as f64 + 0.5;
    let right = correct as f64 + 0.5;
    (wrong / right).ln()
}

pub async fn run(db: &Database, job: &BatchJob) -> Result<TaskOutput, TaskError> {
    let payload: IrtPayload = serde_json::from_value(job.payload.clone())
        .map_err(|e| TaskError::Payload(e.to_string()))?;
    if payload.responses.is_empty() {
        return Err(TaskError::Payload("no response tallies".to_string()));
    }

    let mut difficulties = serde_json::Map::new();
    let mut leaf_scores: HashMap<String, f64> = HashMap::new();
    for tally in &payload.responses {
        if tally.total == 0 || tally.correct > tally.total {
            return Err(TaskError::Payload(format!(
                "bad tally for item {}: {}/{}",
                tally.item_id, tally.correct, tally.total
            )));
        }
        difficulties.insert(
            tally.item_id.clone(),
            json!(difficulty(tally.correct, tally.total)),
        );
        leaf_scores.insert(tally.item_id.clone(), tally.correct as f64 / tally.total as f64);
    }

    // Abilities roll up through whatever portion of the tallied items lives
    // in the content tree.
    let nodes = db.all_tree_nodes().await?;
    let abilities = roll_up_scores(&nodes, &leaf_scores);

    let items = payload.responses.len();
    let mean_difficulty = difficulties
        .values()
        .filter_map(|v| v.as_f64())
        .sum::<f64>()
        / items as f64;

    let stats = json!({
        "items": items,
        "difficulties": difficulties,
        "abilities": abilities,
    });
    let artifact_id = db.insert_artifact(&job.id, "irt", None, &stats).await?;

    info!(artifact_id = %artifact_id, items, "irt model fitted");
    Ok(TaskOutput {
        output_ref: Some(artifact_id),
        generated_id: None,
        metadata: json!({ "items": items, "mean_difficulty": mean_difficulty }),
    })
}
