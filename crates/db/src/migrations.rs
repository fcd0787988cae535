// crates/db/src/migrations.rs
/// Inline SQL migrations for the atrium database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: jobs table
    r#"
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    job_type TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    payload TEXT NOT NULL DEFAULT '{}',
    output_ref TEXT,
    generated_id TEXT,
    error TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    started_at INTEGER,
    finished_at INTEGER
);
"#,
    // Migration 2: jobs indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(created_at DESC);
"#,
    // Migration 3: learning objects table
    r#"
CREATE TABLE IF NOT EXISTS objects (
    id TEXT PRIMARY KEY,
    parent_id TEXT,
    level INTEGER NOT NULL,
    title TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '{}',
    version INTEGER NOT NULL DEFAULT 1,
    deleted INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_objects_parent ON objects(parent_id);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_objects_level ON objects(level);
"#,
    // Migration 4: derived lookup table rebuilt by the query_engine_build job
    r#"
CREATE TABLE IF NOT EXISTS content_index (
    object_id TEXT PRIMARY KEY,
    descendant_count INTEGER NOT NULL DEFAULT 0,
    built_at INTEGER NOT NULL
);
"#,
    // Migration 5: model artifacts written by training jobs
    r#"
CREATE TABLE IF NOT EXISTS model_artifacts (
    id TEXT PRIMARY KEY,
    job_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    location TEXT,
    stats TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_artifacts_job ON model_artifacts(job_id);
"#,
];
