// crates/worker/src/tasks/zip_structure.rs
// Rebuild a content tree from an archive manifest.
//
// The payload carries the slash-separated entry paths of an uploaded
// archive; shared path prefixes become shared folder nodes under one
// generated root.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use atrium_core::{ContentRepository, LearningObject, MAX_TREE_DEPTH};
use atrium_db::Database;

use super::{TaskError, TaskOutput};

#[derive(Debug, Deserialize)]
struct ZipManifest {
    #[serde(default = "default_root_title")]
    root_title: String,
    entries: Vec<String>,
}

fn default_root_title() -> String {
    "archive".to_string()
}

pub async fn run(db: &Database, payload: &serde_json::Value) -> Result<TaskOutput, TaskError> {
    let manifest: ZipManifest = serde_json::from_value(payload.clone())
        .map_err(|e| TaskError::Payload(e.to_string()))?;
    if manifest.entries.is_empty() {
        return Err(TaskError::Payload("manifest has no entries".to_string()));
    }

    let root = LearningObject::new(manifest.root_title, "archive", json!({}), None)?;
    db.save(&root).await?;

    // Nodes keyed by full path so shared prefixes are created once.
    let mut by_path: HashMap<String, LearningObject> = HashMap::new();
    let mut nodes: u64 = 1;
    for entry in &manifest.entries {
        let segments: Vec<&str> = entry.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(TaskError::Payload(format!("empty entry path: {entry:?}")));
        }
        // The root occupies level 1, leaving one level per path segment.
        if segments.len() as i64 > MAX_TREE_DEPTH - 1 {
            return Err(TaskError::Payload(format!(
                "entry {entry:?} nests deeper than {} segments",
                MAX_TREE_DEPTH - 1
            )));
        }

        let mut path = String::new();
        let mut parent = root.clone();
        for (i, segment) in segments.iter().enumerate() {
            path.push('/');
            path.push_str(segment);
            if let Some(existing) = by_path.get(&path) {
                parent = existing.clone();
                continue;
            }
            let is_leaf = i + 1 == segments.len();
            let kind = if is_leaf { "file" } else { "folder" };
            let object = LearningObject::new(
                segment.to_string(),
                kind,
                json!({"path": path.clone()}),
                Some(&parent),
            )?;
            db.save(&object).await?;
            nodes += 1;
            by_path.insert(path.clone(), object.clone());
            parent = object;
        }
    }

    info!(root_id = %root.id, nodes, entries = manifest.entries.len(), "archive structure rebuilt");
    Ok(TaskOutput {
        output_ref: None,
        generated_id: Some(root.id.clone()),
        metadata: json!({ "nodes": nodes, "entries": manifest.entries.len() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_prefixes_become_shared_folders() {
        let db = Database::new_in_memory().await.unwrap();
        let payload = json!({
            "root_title": "course-upload",
            "entries": [
                "unit1/lesson1.pdf",
                "unit1/lesson2.pdf",
                "unit2/lesson1.pdf"
            ]
        });

        let output = run(&db, &payload).await.unwrap();
        // root + unit1 + unit2 + three files
        assert_eq!(output.metadata["nodes"], 6);

        let root_id = output.generated_id.unwrap();
        let folders = db.children(Some(root_id.as_str())).await.unwrap();
        assert_eq!(folders.len(), 2);
        let unit1 = folders.iter().find(|f| f.title == "unit1").unwrap();
        assert_eq!(unit1.kind, "folder");
        let files = db.children(Some(unit1.id.as_str())).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.kind == "file"));
    }

    #[tokio::test]
    async fn test_empty_manifest_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        let err = run(&db, &json!({"entries": []})).await.unwrap_err();
        assert!(matches!(err, TaskError::Payload(_)));
    }

    #[tokio::test]
    async fn test_too_deep_entry_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        let err = run(&db, &json!({"entries": ["a/b/c/d/e.pdf"]}))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Payload(_)));
    }

    #[tokio::test]
    async fn test_leading_slashes_normalized() {
        let db = Database::new_in_memory().await.unwrap();
        let output = run(&db, &json!({"entries": ["/readme.txt"]})).await.unwrap();
        assert_eq!(output.metadata["nodes"], 2);
    }
}
