//! Test Journal Manager
//!
//! Provides isolated journal databases for testing:
//! - Temporary databases that are automatically cleaned up
//! - Reopening an existing database file to check durability
//! - Core components wired to the same store

use std::path::PathBuf;
use std::sync::Arc;

use somnia_core::{
    DreamStore, EnrichmentPipeline, MetricsAggregator, SemanticRetriever, Storage, TextEmbedder,
    TextGenerator,
};
use tempfile::TempDir;

/// Manager for test journals
///
/// Each test gets its own database. The temporary directory lives as long
/// as the manager does.
///
/// # Example
///
/// ```rust,ignore
/// let journal = TestJournal::new_temp();
/// let pipeline = journal.pipeline(generator, embedder);
/// pipeline.submit("Lobos", "Me perseguían lobos", "poema").await?;
/// assert_eq!(journal.dream_count(), 1);
/// ```
pub struct TestJournal {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestJournal {
    /// Create a new journal in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_somnia.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Open a journal at a specific path. The file is NOT deleted afterwards.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to open test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn is_empty(&self) -> bool {
        self.dream_count() == 0
    }

    /// Number of stored dreams
    pub fn dream_count(&self) -> i64 {
        self.storage.count().unwrap_or(0)
    }

    /// Store handle as the components see it
    pub fn store(&self) -> Arc<dyn DreamStore> {
        self.storage.clone()
    }

    // ========================================================================
    // COMPONENTS
    // ========================================================================

    pub fn pipeline(
        &self,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> EnrichmentPipeline {
        EnrichmentPipeline::new(generator, embedder, self.store())
    }

    pub fn retriever(&self, embedder: Arc<dyn TextEmbedder>) -> SemanticRetriever {
        SemanticRetriever::new(embedder, self.store())
    }

    pub fn metrics(&self) -> MetricsAggregator {
        MetricsAggregator::new(self.store())
    }
}
