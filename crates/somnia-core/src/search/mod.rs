//! Search Module
//!
//! Brute-force semantic retrieval over stored dream embeddings:
//! - Cosine similarity against every compatible stored vector
//! - Top-K ranking, stable on ties
//! - Query embeddings cached per query string

mod semantic;

pub use semantic::{
    rank_by_similarity, SearchError, SearchHit, SearchResults, SemanticRetriever,
    DEFAULT_TOP_K, QUERY_CACHE_CAPACITY,
};
