// crates/server/src/routes/objects.rs
//! API routes for learning-object content.
//!
//! - POST   /objects           - Create an object (optionally under a parent)
//! - GET    /objects/{id}      - Fetch a live object
//! - PUT    /objects/{id}      - Patch fields, bumping the version
//! - DELETE /objects/{id}      - Soft-delete the object and its subtree
//! - GET    /objects/{id}/tree - Fetch the subtree rooted at an object

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use atrium_core::{
    ContentRepository, Envelope, LearningObject, ObjectPatch, ServiceError, MAX_TREE_DEPTH,
};

use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for POST /api/v1/objects.
#[derive(Debug, Deserialize)]
pub struct CreateObjectRequest {
    pub title: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default = "empty_object")]
    pub body: serde_json::Value,
    pub parent_id: Option<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// One node of a subtree response: the object plus its live children.
#[derive(Debug, Serialize)]
pub struct ObjectTree {
    #[serde(flatten)]
    pub object: LearningObject,
    pub children: Vec<ObjectTree>,
}

/// Counts reported by a soft delete.
#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub marked: u64,
}

/// POST /api/v1/objects - create a node, validating the parent and depth.
async fn create_object(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateObjectRequest>,
) -> ApiResult<Json<Envelope<LearningObject>>> {
    if req.title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".into()).into());
    }

    let parent = match &req.parent_id {
        Some(parent_id) => Some(
            state
                .content
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::Validation(format!("parent object {parent_id} not found"))
                })?,
        ),
        None => None,
    };

    let object = LearningObject::new(req.title, req.kind, req.body, parent.as_ref())?;
    state.content.save(&object).await?;
    tracing::info!(object_id = %object.id, level = object.level, "object created");
    Ok(Json(Envelope::ok("object created", object)))
}

/// GET /api/v1/objects/{id} - soft-deleted and unknown both read 404.
async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<LearningObject>>> {
    let object = state
        .content
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ServiceError::not_found("object", &id))?;
    Ok(Json(Envelope::ok("object", object)))
}

/// PUT /api/v1/objects/{id} - apply a patch; every patch bumps the version.
async fn update_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ObjectPatch>,
) -> ApiResult<Json<Envelope<LearningObject>>> {
    if patch.is_empty() {
        return Err(ServiceError::Validation("patch must set at least one field".into()).into());
    }
    let object = state.content.update(&id, &patch).await?;
    Ok(Json(Envelope::ok("object updated", object)))
}

/// DELETE /api/v1/objects/{id} - soft-delete the node and its subtree.
async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<DeletedData>>> {
    let marked = state.content.soft_delete(&id).await?;
    tracing::info!(object_id = %id, marked, "object subtree soft-deleted");
    Ok(Json(Envelope::ok("object deleted", DeletedData { marked })))
}

/// GET /api/v1/objects/{id}/tree - level-by-level fan-out from the root.
async fn get_object_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<ObjectTree>>> {
    let root = state
        .content
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ServiceError::not_found("object", &id))?;

    // Collect descendants breadth-first; the hierarchy bounds the loop.
    let mut descendants: Vec<LearningObject> = Vec::new();
    let mut frontier = vec![root.id.clone()];
    for _ in 1..MAX_TREE_DEPTH {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for parent_id in &frontier {
            let children = state.content.children(Some(parent_id.as_str())).await?;
            next.extend(children.iter().map(|c| c.id.clone()));
            descendants.extend(children);
        }
        frontier = next;
    }

    Ok(Json(Envelope::ok("object tree", assemble(root, descendants))))
}

/// Assemble a flat descendant list into the nested tree view.
fn assemble(root: LearningObject, descendants: Vec<LearningObject>) -> ObjectTree {
    let mut by_parent: HashMap<String, Vec<LearningObject>> = HashMap::new();
    for object in descendants {
        if let Some(parent_id) = object.parent_id.clone() {
            by_parent.entry(parent_id).or_default().push(object);
        }
    }
    attach(root, &mut by_parent)
}

fn attach(object: LearningObject, by_parent: &mut HashMap<String, Vec<LearningObject>>) -> ObjectTree {
    let children = by_parent
        .remove(&object.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, by_parent))
        .collect();
    ObjectTree { object, children }
}

/// Build the objects router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/objects", axum::routing::post(create_object))
        .route(
            "/objects/{id}",
            get(get_object).put(update_object).delete(delete_object),
        )
        .route("/objects/{id}/tree", get(get_object_tree))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: &str, parent: Option<&str>, level: i64) -> LearningObject {
        LearningObject {
            id: id.to_string(),
            parent_id: parent.map(str::to_string),
            level,
            title: id.to_string(),
            kind: "topic".to_string(),
            body: serde_json::json!({}),
            version: 1,
            deleted: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_assemble_nests_children() {
        let root = object("root", None, 1);
        let descendants = vec![
            object("a", Some("root"), 2),
            object("b", Some("root"), 2),
            object("a1", Some("a"), 3),
        ];

        let tree = assemble(root, descendants);
        assert_eq!(tree.children.len(), 2);
        let a = tree.children.iter().find(|c| c.object.id == "a").unwrap();
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].object.id, "a1");
    }

    #[test]
    fn test_tree_serialization_flattens_object() {
        let tree = assemble(object("root", None, 1), vec![]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["id"], "root");
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateObjectRequest =
            serde_json::from_str(r#"{"title": "Algebra"}"#).unwrap();
        assert_eq!(req.title, "Algebra");
        assert_eq!(req.kind, "");
        assert_eq!(req.body, serde_json::json!({}));
        assert!(req.parent_id.is_none());
    }
}
