// crates/db/src/content.rs
// Learning-object storage: CRUD with soft delete, versioning, and the
// derived content_index table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use atrium_core::{
    ContentRepository, LearningObject, ObjectPatch, ServiceError, ServiceResult, TreeNode,
    MAX_TREE_DEPTH,
};

use crate::{Database, DbError, DbResult};

/// Internal row type for the `objects` table.
#[derive(Debug)]
struct ObjectRow {
    id: String,
    parent_id: Option<String>,
    level: i64,
    title: String,
    kind: String,
    body: String,
    version: i64,
    deleted: i64,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for ObjectRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            parent_id: row.try_get("parent_id")?,
            level: row.try_get("level")?,
            title: row.try_get("title")?,
            kind: row.try_get("kind")?,
            body: row.try_get("body")?,
            version: row.try_get("version")?,
            deleted: row.try_get("deleted")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ObjectRow {
    fn into_object(self) -> LearningObject {
        LearningObject {
            body: serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null),
            id: self.id,
            parent_id: self.parent_id,
            level: self.level,
            title: self.title,
            kind: self.kind,
            version: self.version,
            deleted: self.deleted != 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl ContentRepository for Database {
    async fn find_by_id(&self, id: &str) -> ServiceResult<Option<LearningObject>> {
        let row: Option<ObjectRow> =
            sqlx::query_as("SELECT * FROM objects WHERE id = ?1 AND deleted = 0")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(DbError::from)?;
        Ok(row.map(ObjectRow::into_object))
    }

    async fn save(&self, object: &LearningObject) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO objects (
                id, parent_id, level, title, kind, body,
                version, deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&object.id)
        .bind(&object.parent_id)
        .bind(object.level)
        .bind(&object.title)
        .bind(&object.kind)
        .bind(object.body.to_string())
        .bind(object.version)
        .bind(object.deleted as i64)
        .bind(object.created_at)
        .bind(object.updated_at)
        .execute(self.pool())
        .await
        .map_err(DbError::from)?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: &ObjectPatch) -> ServiceResult<LearningObject> {
        let updated_at = Utc::now().timestamp();
        // COALESCE keeps unpatched columns; version always bumps.
        let result = sqlx::query(
            r#"
            UPDATE objects SET
                title = COALESCE(?2, title),
                kind = COALESCE(?3, kind),
                body = COALESCE(?4, body),
                version = version + 1,
                updated_at = ?5
            WHERE id = ?1 AND deleted = 0
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.kind)
        .bind(patch.body.as_ref().map(|b| b.to_string()))
        .bind(updated_at)
        .execute(self.pool())
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("object", id));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("object", id))
    }

    async fn soft_delete(&self, id: &str) -> ServiceResult<u64> {
        let ids = self.collect_subtree_ids(id).await?;
        if ids.is_empty() {
            return Err(ServiceError::not_found("object", id));
        }

        let mut marked = 0u64;
        for id in &ids {
            let result = sqlx::query("UPDATE objects SET deleted = 1 WHERE id = ?1 AND deleted = 0")
                .bind(id)
                .execute(self.pool())
                .await
                .map_err(DbError::from)?;
            marked += result.rows_affected();
        }
        Ok(marked)
    }

    async fn children(&self, parent_id: Option<&str>) -> ServiceResult<Vec<LearningObject>> {
        let rows: Vec<ObjectRow> = match parent_id {
            Some(parent) => {
                sqlx::query_as(
                    "SELECT * FROM objects WHERE parent_id = ?1 AND deleted = 0 ORDER BY created_at, id",
                )
                .bind(parent)
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query_as(
                    "SELECT * FROM objects WHERE parent_id IS NULL AND deleted = 0 ORDER BY created_at, id",
                )
                .fetch_all(self.pool())
                .await
            }
        }
        .map_err(DbError::from)?;
        Ok(rows.into_iter().map(ObjectRow::into_object).collect())
    }
}

/// One row of the derived `content_index` lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIndexEntry {
    pub object_id: String,
    pub descendant_count: i64,
    pub built_at: i64,
}

impl Database {
    /// Ids of a live object and all its live descendants, found by
    /// level-by-level fan-out bounded by the fixed hierarchy depth.
    pub(crate) async fn collect_subtree_ids(&self, root: &str) -> ServiceResult<Vec<String>> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT id FROM objects WHERE id = ?1 AND deleted = 0")
                .bind(root)
                .fetch_optional(self.pool())
                .await
                .map_err(DbError::from)?;
        let Some(_) = exists else {
            return Ok(Vec::new());
        };

        let mut collected = vec![root.to_string()];
        let mut frontier = vec![root.to_string()];
        for _ in 1..MAX_TREE_DEPTH {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for parent in &frontier {
                let rows: Vec<(String,)> = sqlx::query_as(
                    "SELECT id FROM objects WHERE parent_id = ?1 AND deleted = 0",
                )
                .bind(parent)
                .fetch_all(self.pool())
                .await
                .map_err(DbError::from)?;
                next.extend(rows.into_iter().map(|r| r.0));
            }
            collected.extend(next.iter().cloned());
            frontier = next;
        }
        Ok(collected)
    }

    /// All live nodes as bare (id, parent, level) triples, for roll-ups.
    pub async fn all_tree_nodes(&self) -> DbResult<Vec<TreeNode>> {
        let rows: Vec<(String, Option<String>, i64)> =
            sqlx::query_as("SELECT id, parent_id, level FROM objects WHERE deleted = 0")
                .fetch_all(self.pool())
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, parent_id, level)| TreeNode {
                id,
                parent_id,
                level,
            })
            .collect())
    }

    /// Rebuild the `content_index` table from live objects.
    ///
    /// Descendant counts are computed in memory from the (id, parent) pairs;
    /// the table is replaced wholesale. Returns the number of rows written.
    pub async fn rebuild_content_index(&self) -> DbResult<u64> {
        let nodes = self.all_tree_nodes().await?;

        // Count descendants per node by walking each node's parent chain.
        let parent_of: std::collections::HashMap<&str, Option<&str>> = nodes
            .iter()
            .map(|n| (n.id.as_str(), n.parent_id.as_deref()))
            .collect();
        let mut counts: std::collections::HashMap<&str, i64> =
            nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
        for node in &nodes {
            let mut cursor = node.parent_id.as_deref();
            while let Some(parent) = cursor {
                if let Some(count) = counts.get_mut(parent) {
                    *count += 1;
                }
                cursor = parent_of.get(parent).copied().flatten();
            }
        }

        let built_at = Utc::now().timestamp();
        sqlx::query("DELETE FROM content_index")
            .execute(self.pool())
            .await?;
        let mut written = 0u64;
        for node in &nodes {
            sqlx::query(
                "INSERT INTO content_index (object_id, descendant_count, built_at) VALUES (?1, ?2, ?3)",
            )
            .bind(&node.id)
            .bind(counts[node.id.as_str()])
            .bind(built_at)
            .execute(self.pool())
            .await?;
            written += 1;
        }
        Ok(written)
    }

    /// Read a content_index row (status lookups and tests).
    pub async fn content_index_entry(&self, object_id: &str) -> DbResult<Option<ContentIndexEntry>> {
        let row: Option<(String, i64, i64)> = sqlx::query_as(
            "SELECT object_id, descendant_count, built_at FROM content_index WHERE object_id = ?1",
        )
        .bind(object_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(|(object_id, descendant_count, built_at)| ContentIndexEntry {
            object_id,
            descendant_count,
            built_at,
        }))
    }
}
