//! Local Semantic Embeddings
//!
//! Uses fastembed v5 for local inference with all-MiniLM-L6-v2
//! (ONNX, 384 dimensions). No external API calls required.

use std::sync::{Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{EmbeddingError, TextEmbedder};
use crate::journal::truncate_chars;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Output dimensions of all-MiniLM-L6-v2
pub const EMBEDDING_DIMENSIONS: usize = 384;

/// Maximum text length for embedding, in characters (truncated if longer)
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Model identifier recorded next to every stored vector
pub const MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

// ============================================================================
// GLOBAL MODEL (with Mutex for fastembed v5 API)
// ============================================================================

static EMBEDDING_MODEL_RESULT: OnceLock<Result<Mutex<TextEmbedding>, String>> = OnceLock::new();

/// Get the default cache directory for fastembed models
/// Uses FASTEMBED_CACHE_PATH env var, or falls back to platform cache directory
fn get_cache_dir() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("FASTEMBED_CACHE_PATH") {
        return std::path::PathBuf::from(path);
    }

    // Linux: ~/.cache/somnia/fastembed
    // macOS: ~/Library/Caches/com.somnia.journal/fastembed
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "somnia", "journal") {
        return proj_dirs.cache_dir().join("fastembed");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".cache/somnia/fastembed");
    }

    std::path::PathBuf::from(".fastembed_cache")
}

/// Initialize the global embedding model once per process
fn get_model() -> Result<MutexGuard<'static, TextEmbedding>, EmbeddingError> {
    let result = EMBEDDING_MODEL_RESULT.get_or_init(|| {
        let cache_dir = get_cache_dir();

        if let Err(e) = std::fs::create_dir_all(&cache_dir) {
            tracing::warn!("Failed to create cache directory {:?}: {}", cache_dir, e);
        }

        let options = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(true)
            .with_cache_dir(cache_dir);

        TextEmbedding::try_new(options).map(Mutex::new).map_err(|e| {
            format!(
                "Failed to initialize all-MiniLM-L6-v2 embedding model: {}. \
                Ensure ONNX runtime is available and model files can be downloaded.",
                e
            )
        })
    });

    match result {
        Ok(model) => model
            .lock()
            .map_err(|e| EmbeddingError::ModelInit(format!("Lock poisoned: {}", e))),
        Err(err) => Err(EmbeddingError::ModelInit(err.clone())),
    }
}

fn embed_blocking(text: &str) -> Result<Vec<f32>, EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::InvalidInput(
            "Text cannot be empty".to_string(),
        ));
    }

    let text = truncate_chars(text, MAX_TEXT_LENGTH);
    let mut model = get_model()?;

    let embeddings = model
        .embed(vec![text], None)
        .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

    embeddings
        .into_iter()
        .next()
        .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding generated".to_string()))
}

// ============================================================================
// EMBEDDER
// ============================================================================

/// Local embedder backed by the process-wide fastembed model
#[derive(Debug, Default, Clone, Copy)]
pub struct FastEmbedder;

impl FastEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Load the shared model, downloading it on first use. Blocking.
    pub fn init(&self) -> Result<(), EmbeddingError> {
        get_model().map(|_| ())
    }

    pub fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}

#[async_trait]
impl TextEmbedder for FastEmbedder {
    fn model_id(&self) -> &str {
        MODEL_ID
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || embed_blocking(&text))
            .await
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Embedding task failed: {}", e)))?
    }
}
