// crates/core/src/content.rs
//! Learning-object content model.
//!
//! Content is a tree of learning objects at most [`MAX_TREE_DEPTH`] levels
//! deep (course, unit, topic, lesson, item). Objects are never hard-deleted
//! by normal flow: deletion marks the node and its subtree, and every update
//! bumps the version counter.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// The content hierarchy is fixed at five levels; level 1 is a root.
pub const MAX_TREE_DEPTH: i64 = 5;

/// One node in the content tree.
#[derive(Debug, Clone, Serialize)]
pub struct LearningObject {
    pub id: String,
    pub parent_id: Option<String>,
    /// Depth in the tree, 1 (root) through [`MAX_TREE_DEPTH`].
    pub level: i64,
    pub title: String,
    /// Free tag describing the node kind (course, topic, item, ...).
    pub kind: String,
    /// Opaque JSON body; the platform stores, versions, and returns it.
    pub body: serde_json::Value,
    /// Starts at 1, incremented on every update.
    pub version: i64,
    pub deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LearningObject {
    /// Create a new node under `parent` (or a root when `parent` is `None`).
    ///
    /// The child's level is the parent's plus one; creating below level
    /// [`MAX_TREE_DEPTH`] is a validation error.
    pub fn new(
        title: impl Into<String>,
        kind: impl Into<String>,
        body: serde_json::Value,
        parent: Option<&LearningObject>,
    ) -> ServiceResult<Self> {
        let level = match parent {
            Some(p) => p.level + 1,
            None => 1,
        };
        if level > MAX_TREE_DEPTH {
            return Err(ServiceError::Validation(format!(
                "content tree is limited to {MAX_TREE_DEPTH} levels"
            )));
        }
        let now = Utc::now().timestamp();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            parent_id: parent.map(|p| p.id.clone()),
            level,
            title: title.into(),
            kind: kind.into(),
            body,
            version: 1,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update applied to an object; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectPatch {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ObjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.kind.is_none() && self.body.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root() -> LearningObject {
        LearningObject::new("Algebra I", "course", serde_json::json!({}), None).unwrap()
    }

    #[test]
    fn test_root_is_level_one() {
        let r = root();
        assert_eq!(r.level, 1);
        assert_eq!(r.version, 1);
        assert!(r.parent_id.is_none());
        assert!(!r.deleted);
    }

    #[test]
    fn test_child_level_is_parent_plus_one() {
        let r = root();
        let child =
            LearningObject::new("Linear equations", "unit", serde_json::json!({}), Some(&r))
                .unwrap();
        assert_eq!(child.level, 2);
        assert_eq!(child.parent_id.as_deref(), Some(r.id.as_str()));
    }

    #[test]
    fn test_depth_limit_enforced() {
        let mut node = root();
        for level in 2..=MAX_TREE_DEPTH {
            node = LearningObject::new(
                format!("level {level}"),
                "topic",
                serde_json::json!({}),
                Some(&node),
            )
            .unwrap();
        }
        assert_eq!(node.level, MAX_TREE_DEPTH);

        let err = LearningObject::new("too deep", "item", serde_json::json!({}), Some(&node))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ObjectPatch::default().is_empty());
        let patch = ObjectPatch {
            title: Some("renamed".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
