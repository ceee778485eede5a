//! Semantic Embeddings Module
//!
//! The embedding collaborator seam, the JSON column codec for stored vectors
//! and the similarity used by retrieval. Local inference (fastembed,
//! all-MiniLM-L6-v2) sits behind the `embeddings` feature.

#[cfg(feature = "embeddings")]
mod local;

#[cfg(feature = "embeddings")]
pub use local::{FastEmbedder, EMBEDDING_DIMENSIONS, MAX_TEXT_LENGTH, MODEL_ID};

use async_trait::async_trait;

#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Model initialization failed: {0}")]
    ModelInit(String),
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Text-embedding collaborator
///
/// Vectors from different `model_id`s are not comparable; storage records the
/// id next to every vector so retrieval can skip mismatches.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Identifier of the model (and version) producing the vectors
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

// ============================================================================
// STORAGE CODEC
// ============================================================================

/// Column value for "no embedding"
pub const EMPTY_VECTOR_JSON: &str = "[]";

/// Encode a vector as the JSON array stored in the `embedding_vector` column
pub fn vector_to_json(vector: &[f32]) -> String {
    serde_json::to_string(vector).unwrap_or_else(|_| EMPTY_VECTOR_JSON.to_string())
}

/// Decode a stored column. An empty array or unreadable text means no vector.
pub fn vector_from_json(text: &str) -> Option<Vec<f32>> {
    serde_json::from_str::<Vec<f32>>(text)
        .ok()
        .filter(|vector| !vector.is_empty())
}

// ============================================================================
// SIMILARITY
// ============================================================================

/// Cosine similarity in [-1, 1]
///
/// Vectors of different length, or with a zero norm, score 0.0.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denominator = (norm_a * norm_b).sqrt();
    if denominator > 0.0 {
        dot / denominator
    } else {
        0.0
    }
}
