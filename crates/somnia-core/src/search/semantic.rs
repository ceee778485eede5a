//! Semantic Retriever
//!
//! Holds no index of its own. Every query reads all stored embeddings,
//! drops the ones that are missing or not comparable with the current
//! embedder, scores the rest by cosine similarity and keeps the top K.
//! O(n) per query.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::embeddings::{cosine_similarity, EmbeddingError, TextEmbedder};
use crate::journal::{EmbeddedDream, EmotionTag};
use crate::storage::{DreamStore, StorageError};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Results returned when no top-K is configured
pub const DEFAULT_TOP_K: usize = 5;

/// Distinct queries whose embeddings are kept in memory
pub const QUERY_CACHE_CAPACITY: usize = 100;

// ============================================================================
// TYPES
// ============================================================================

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search query cannot be empty")]
    EmptyQuery,
    #[error("Failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("Failed to read embeddings: {0}")]
    Storage(#[from] StorageError),
}

/// One ranked record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    pub date_recorded: DateTime<Utc>,
    pub emotion: EmotionTag,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Best match first
    pub hits: Vec<SearchHit>,
    /// Records scored against the query
    pub scored: usize,
    /// Records with an embedding from another model or of another dimension
    pub skipped: usize,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

// ============================================================================
// RANKING
// ============================================================================

/// Score every candidate against `query` and keep the `k` best.
///
/// Sorting is stable, so candidates with equal scores keep their input order.
pub fn rank_by_similarity<'a, T>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, &'a [f32])>,
    k: usize,
) -> Vec<(T, f32)> {
    let mut scored: Vec<(T, f32)> = candidates
        .into_iter()
        .map(|(item, vector)| (item, cosine_similarity(query, vector)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}

// ============================================================================
// RETRIEVER
// ============================================================================

pub struct SemanticRetriever {
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn DreamStore>,
    top_k: usize,
    query_cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl SemanticRetriever {
    pub fn new(embedder: Arc<dyn TextEmbedder>, store: Arc<dyn DreamStore>) -> Self {
        let capacity = NonZeroUsize::new(QUERY_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
            query_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Set how many hits a search returns (at least one)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Rank stored dreams against `query`, returning the configured top K
    pub async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        self.search_top(query, self.top_k).await
    }

    /// Rank stored dreams against `query`, returning at most `limit` hits
    pub async fn search_top(&self, query: &str, limit: usize) -> Result<SearchResults, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let model_id = self.embedder.model_id();
        let mut skipped = 0;
        let mut candidates = Vec::new();
        for mut dream in self.store.fetch_embeddings()? {
            let vector = match dream.embedding.take() {
                Some(vector) if !vector.is_empty() => vector,
                _ => continue,
            };
            if dream.embedding_model.as_deref() != Some(model_id) {
                debug!(
                    id = dream.id,
                    stored_model = dream.embedding_model.as_deref().unwrap_or("unknown"),
                    current_model = model_id,
                    "Skipping embedding from another model"
                );
                skipped += 1;
                continue;
            }
            candidates.push((dream, vector));
        }

        if candidates.is_empty() {
            return Ok(SearchResults {
                hits: vec![],
                scored: 0,
                skipped,
            });
        }

        let query_vector = self.query_embedding(query).await?;

        let (comparable, mismatched): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|(_, vector)| vector.len() == query_vector.len());
        for (dream, vector) in &mismatched {
            debug!(
                id = dream.id,
                stored_dimensions = vector.len(),
                query_dimensions = query_vector.len(),
                "Skipping embedding with mismatched dimensions"
            );
        }
        skipped += mismatched.len();

        let scored = comparable.len();
        let hits = rank_by_similarity(
            &query_vector,
            comparable.iter().map(|(dream, vector)| (dream, vector.as_slice())),
            limit.max(1),
        )
        .into_iter()
        .map(|(dream, score)| to_hit(dream, score))
        .collect();

        Ok(SearchResults {
            hits,
            scored,
            skipped,
        })
    }

    /// Embed a query, reusing the cached vector for repeated queries
    async fn query_embedding(&self, query: &str) -> Result<Vec<f32>, SearchError> {
        if let Some(cached) = self.cached(query) {
            return Ok(cached);
        }

        let vector = self.embedder.embed(query).await?;

        if let Ok(mut cache) = self.query_cache.lock() {
            cache.put(query.to_string(), vector.clone());
        }

        Ok(vector)
    }

    fn cached(&self, query: &str) -> Option<Vec<f32>> {
        // A poisoned cache only costs a re-embed
        self.query_cache.lock().ok()?.get(query).cloned()
    }
}

fn to_hit(dream: &EmbeddedDream, score: f32) -> SearchHit {
    SearchHit {
        id: dream.id,
        title: dream.title.clone(),
        date_recorded: dream.date_recorded,
        emotion: dream.emotion,
        score,
    }
}

// ============================================================================
// TESTS
// ============================================================================
