//! SQLite Storage Implementation
//!
//! Core storage layer for the dream journal.

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::DreamStore;
use crate::embeddings::{vector_from_json, vector_to_json, EMPTY_VECTOR_JSON};
use crate::journal::{
    CreativeFormat, DreamPreview, DreamRecord, EmbeddedDream, EmotionTag, MetricsRow, NewDream,
    PREVIEW_CHARS,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A connection mutex was poisoned by a panicking holder
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite dream store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so callers can
/// share it as `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("SOMNIA_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database path in the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "somnia", "journal").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().join("somnia.db"))
    }

    /// Create new storage instance
    ///
    /// `None` uses [`Storage::default_path`] and restricts that directory to
    /// the owner. A caller-supplied path's directories are created if missing
    /// but their permissions are left alone.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => {
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                p
            }
            None => {
                let path = Self::default_path()?;
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                    // Only the data dir we own is restricted to owner-only
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::PermissionsExt;
                        let perms = std::fs::Permissions::from_mode(0o700);
                        let _ = std::fs::set_permissions(parent, perms);
                    }
                }
                path
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(applied, path = %path.display(), "Database schema updated");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer.lock().map_err(|_| StorageError::LockPoisoned("Writer"))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader.lock().map_err(|_| StorageError::LockPoisoned("Reader"))
    }

    /// Number of stored dreams
    pub fn count(&self) -> Result<i64> {
        let reader = self.reader()?;
        Ok(reader.query_row("SELECT COUNT(*) FROM dreams", [], |row| row.get(0))?)
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        // Fixed-width so lexicographic order equals chronological order
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(format!("Invalid {} timestamp '{}': {}", field_name, value, e)))
    }

    fn parse_emotion(value: &str) -> EmotionTag {
        EmotionTag::parse_label(value).unwrap_or_else(|| {
            tracing::warn!(emotion_tag = value, "Unknown stored emotion tag, reading as unclassified");
            EmotionTag::Unclassified
        })
    }

    fn parse_format(value: &str) -> rusqlite::Result<CreativeFormat> {
        value.parse().map_err(conversion_error)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DreamRecord> {
        let date_recorded: String = row.get("date_recorded")?;
        let emotion_tag: String = row.get("emotion_tag")?;
        let creative_format: String = row.get("creative_format")?;
        let embedding_vector: String = row.get("embedding_vector")?;

        Ok(DreamRecord {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            date_recorded: Self::parse_timestamp(&date_recorded, "date_recorded")?,
            emotion: Self::parse_emotion(&emotion_tag),
            creative_format: Self::parse_format(&creative_format)?,
            creative_text: row.get("creative_text")?,
            analysis_text: row.get("analysis_text")?,
            embedding: vector_from_json(&embedding_vector),
            embedding_model: row.get("embedding_model")?,
        })
    }

    fn row_to_preview(row: &rusqlite::Row) -> rusqlite::Result<DreamPreview> {
        let date_recorded: String = row.get("date_recorded")?;
        let emotion_tag: String = row.get("emotion_tag")?;
        let creative_format: String = row.get("creative_format")?;

        Ok(DreamPreview {
            id: row.get("id")?,
            title: row.get("title")?,
            preview: row.get("preview")?,
            date_recorded: Self::parse_timestamp(&date_recorded, "date_recorded")?,
            emotion: Self::parse_emotion(&emotion_tag),
            creative_format: Self::parse_format(&creative_format)?,
            creative_preview: row.get("creative_preview")?,
            analysis_preview: row.get("analysis_preview")?,
        })
    }
}

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

impl DreamStore for Storage {
    fn save(&self, dream: &NewDream) -> Result<i64> {
        let now = Utc::now();
        let embedding_json = dream
            .embedding
            .as_deref()
            .map(vector_to_json)
            .unwrap_or_else(|| EMPTY_VECTOR_JSON.to_string());
        // A model id without a vector would claim a comparable embedding
        let embedding_model = dream
            .embedding
            .as_ref()
            .filter(|v| !v.is_empty())
            .and(dream.embedding_model.as_deref());

        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO dreams (
                title, content, date_recorded, emotion_tag, creative_format,
                creative_text, analysis_text, embedding_vector, embedding_model
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                dream.title,
                dream.content,
                Self::format_timestamp(&now),
                dream.emotion.label(),
                dream.creative_format.as_str(),
                dream.creative_text,
                dream.analysis_text,
                embedding_json,
                embedding_model,
            ],
        )?;
        let id = writer.last_insert_rowid();

        tracing::info!(id, title = %dream.title, emotion = %dream.emotion, "Dream saved");
        Ok(id)
    }

    fn fetch_all(&self) -> Result<Vec<DreamPreview>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, title, substr(content, 1, ?1) AS preview, date_recorded,
                    emotion_tag, creative_format,
                    substr(creative_text, 1, ?1) AS creative_preview,
                    substr(analysis_text, 1, ?1) AS analysis_preview
             FROM dreams
             ORDER BY date_recorded DESC, id DESC",
        )?;

        let previews = stmt
            .query_map(params![PREVIEW_CHARS as i64], Self::row_to_preview)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(previews)
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<DreamRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM dreams WHERE id = ?1")?;

        let record = stmt
            .query_row(params![id], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn fetch_metrics(&self) -> Result<Vec<MetricsRow>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT date_recorded, emotion_tag, content FROM dreams
             ORDER BY date_recorded ASC, id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let date_recorded: String = row.get(0)?;
                let emotion_tag: String = row.get(1)?;
                Ok(MetricsRow {
                    date_recorded: Self::parse_timestamp(&date_recorded, "date_recorded")?,
                    emotion: Self::parse_emotion(&emotion_tag),
                    content: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn fetch_embeddings(&self) -> Result<Vec<EmbeddedDream>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, title, date_recorded, emotion_tag, embedding_vector, embedding_model
             FROM dreams
             ORDER BY id ASC",
        )?;

        let dreams = stmt
            .query_map([], |row| {
                let date_recorded: String = row.get(2)?;
                let emotion_tag: String = row.get(3)?;
                let embedding_vector: String = row.get(4)?;
                Ok(EmbeddedDream {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    date_recorded: Self::parse_timestamp(&date_recorded, "date_recorded")?,
                    emotion: Self::parse_emotion(&emotion_tag),
                    embedding: vector_from_json(&embedding_vector),
                    embedding_model: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(dreams)
    }
}

// ============================================================================
// TESTS
// ============================================================================
