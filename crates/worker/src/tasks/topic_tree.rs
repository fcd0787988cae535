// crates/worker/src/tasks/topic_tree.rs
// Materialize a topic-tree payload as learning-object rows.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use atrium_core::{ContentRepository, LearningObject};
use atrium_db::Database;

use super::{TaskError, TaskOutput};

/// Payload shape: a nested tree of topics rooted at one node.
#[derive(Debug, Deserialize)]
struct TopicNode {
    title: String,
    #[serde(default)]
    kind: String,
    #[serde(default = "empty_object")]
    body: serde_json::Value,
    #[serde(default)]
    children: Vec<TopicNode>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

fn kind_or_topic(kind: String) -> String {
    if kind.is_empty() {
        "topic".to_string()
    } else {
        kind
    }
}

pub async fn run(db: &Database, payload: &serde_json::Value) -> Result<TaskOutput, TaskError> {
    let tree: TopicNode = serde_json::from_value(payload.clone())
        .map_err(|e| TaskError::Payload(e.to_string()))?;

    let root = LearningObject::new(tree.title, kind_or_topic(tree.kind), tree.body, None)?;
    db.save(&root).await?;
    let root_id = root.id.clone();

    let mut count: u64 = 1;
    let mut stack: Vec<(TopicNode, LearningObject)> = tree
        .children
        .into_iter()
        .map(|child| (child, root.clone()))
        .collect();
    while let Some((node, parent)) = stack.pop() {
        // Depth beyond the fixed hierarchy fails the whole ingest.
        let object = LearningObject::new(
            node.title,
            kind_or_topic(node.kind),
            node.body,
            Some(&parent),
        )?;
        db.save(&object).await?;
        count += 1;
        stack.extend(node.children.into_iter().map(|child| (child, object.clone())));
    }

    info!(root_id = %root_id, nodes = count, "topic tree ingested");
    Ok(TaskOutput {
        output_ref: None,
        generated_id: Some(root_id),
        metadata: json!({ "nodes": count }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ingest_nested_tree() {
        let db = Database::new_in_memory().await.unwrap();
        let payload = json!({
            "title": "Algebra I",
            "kind": "course",
            "children": [
                {"title": "Linear equations", "kind": "unit", "children": [
                    {"title": "Slope"},
                    {"title": "Intercepts"}
                ]},
                {"title": "Quadratics", "kind": "unit"}
            ]
        });

        let output = run(&db, &payload).await.unwrap();
        assert_eq!(output.metadata["nodes"], 5);

        let root_id = output.generated_id.unwrap();
        let root = db.find_by_id(&root_id).await.unwrap().unwrap();
        assert_eq!(root.title, "Algebra I");
        assert_eq!(root.kind, "course");

        let units = db.children(Some(root_id.as_str())).await.unwrap();
        assert_eq!(units.len(), 2);
        let linear = units.iter().find(|u| u.title == "Linear equations").unwrap();
        let topics = db.children(Some(linear.id.as_str())).await.unwrap();
        assert_eq!(topics.len(), 2);
        // Unspecified kind defaults to topic.
        assert!(topics.iter().all(|t| t.kind == "topic"));
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        let err = run(&db, &json!({"not_a_tree": true})).await.unwrap_err();
        assert!(matches!(err, TaskError::Payload(_)), "{err}");
    }

    #[tokio::test]
    async fn test_tree_deeper_than_hierarchy_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        // Six nested levels; the hierarchy allows five.
        let payload = json!({
            "title": "1", "children": [
                {"title": "2", "children": [
                    {"title": "3", "children": [
                        {"title": "4", "children": [
                            {"title": "5", "children": [
                                {"title": "6"}
                            ]}
                        ]}
                    ]}
                ]}
            ]
        });
        let err = run(&db, &payload).await.unwrap_err();
        assert!(
            matches!(err, TaskError::Service(atrium_core::ServiceError::Validation(_))),
            "{err}"
        );
    }
}
