// crates/worker/src/tasks/query_engine.rs
// Rebuild the derived content_index lookup table from live objects.

use serde_json::json;
use tracing::info;

use atrium_db::Database;

use super::{TaskError, TaskOutput};

pub async fn run(db: &Database) -> Result<TaskOutput, TaskError> {
    let rows = db.rebuild_content_index().await?;
    info!(rows, "content index rebuilt");
    Ok(TaskOutput {
        output_ref: Some("content_index".to_string()),
        generated_id: None,
        metadata: json!({ "rows": rows }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{ContentRepository, LearningObject};

    #[tokio::test]
    async fn test_rebuild_counts_live_objects() {
        let db = Database::new_in_memory().await.unwrap();
        let root =
            LearningObject::new("Course", "course", serde_json::json!({}), None).unwrap();
        db.save(&root).await.unwrap();
        let unit =
            LearningObject::new("Unit", "unit", serde_json::json!({}), Some(&root)).unwrap();
        db.save(&unit).await.unwrap();

        let output = run(&db).await.unwrap();
        assert_eq!(output.metadata["rows"], 2);
        assert_eq!(output.output_ref.as_deref(), Some("content_index"));

        let entry = db.content_index_entry(&root.id).await.unwrap().unwrap();
        assert_eq!(entry.descendant_count, 1);
    }

    #[tokio::test]
    async fn test_rebuild_on_empty_store() {
        let db = Database::new_in_memory().await.unwrap();
        let output = run(&db).await.unwrap();
        assert_eq!(output.metadata["rows"], 0);
    }
}
