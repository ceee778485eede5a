//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Single-insert, write-once dream records
//! - Embeddings stored as JSON arrays alongside their model id
//! - Preview, full-record, reporting and retrieval read paths

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError};

use crate::journal::{DreamPreview, DreamRecord, EmbeddedDream, MetricsRow, NewDream};

/// Durable store contract used by the pipeline, retriever and reports
///
/// Records are immutable once saved; there is no update or delete path.
pub trait DreamStore: Send + Sync {
    /// Persist all fields in one atomic write, returning the assigned id
    fn save(&self, dream: &NewDream) -> Result<i64>;

    /// Previews (text fields truncated), newest first
    fn fetch_all(&self) -> Result<Vec<DreamPreview>>;

    /// Full record by id
    fn fetch_by_id(&self, id: i64) -> Result<Option<DreamRecord>>;

    /// Reporting rows, oldest first; equal dates keep insertion order
    fn fetch_metrics(&self) -> Result<Vec<MetricsRow>>;

    /// Every record's embedding with enough metadata to display a hit
    fn fetch_embeddings(&self) -> Result<Vec<EmbeddedDream>>;
}
