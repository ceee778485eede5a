//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial dream journal schema",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Record embedding model per dream",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS dreams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    date_recorded TEXT NOT NULL,

    -- AI enrichment
    emotion_tag TEXT NOT NULL,
    creative_format TEXT NOT NULL,
    creative_text TEXT NOT NULL DEFAULT '',
    analysis_text TEXT NOT NULL DEFAULT '',

    -- JSON array of floats, '[]' when embedding failed
    embedding_vector TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_dreams_date ON dreams(date_recorded);
CREATE INDEX IF NOT EXISTS idx_dreams_emotion ON dreams(emotion_tag);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Embedding versioning
///
/// Vectors from different embedding models are not comparable. Rows written
/// before this migration keep a NULL model and are skipped by retrieval.
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE dreams ADD COLUMN embedding_model TEXT;

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
