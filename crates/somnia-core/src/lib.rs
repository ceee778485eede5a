//! # Somnia Core
//!
//! Dream journal engine. Every submitted dream is enriched by AI
//! collaborators and stored once; stored dreams can be searched by meaning
//! and summarized for reporting.
//!
//! - **Emotion Classification**: one label from a fixed category set, with
//!   containment recovery for near-miss answers and distinct sentinels
//! - **Structured Insight Extraction**: a cascade of parse strategies that
//!   always yields something renderable from a loosely formatted analysis
//! - **Enrichment Pipeline**: classification, creative rewrite, analysis and
//!   embedding run concurrently, each failing independently, then one write
//! - **Semantic Retrieval**: cosine top-K over stored embeddings, restricted
//!   to vectors from the current embedding model
//! - **Metrics**: zero-filled category counts, a chronological timeline and
//!   the concatenated corpus
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use somnia_core::{EnrichmentPipeline, FastEmbedder, OpenAiGenerator, SemanticRetriever, Storage};
//!
//! let storage = Arc::new(Storage::new(None)?);
//! let generator = Arc::new(OpenAiGenerator::new(endpoint, api_key, "gpt-4o", timeout)?);
//! let embedder = Arc::new(FastEmbedder::new());
//!
//! let pipeline = EnrichmentPipeline::new(generator, embedder.clone(), storage.clone());
//! let submission = pipeline.submit("Lobos", "Me perseguían lobos...", "poema").await?;
//! println!("{}", submission.rendered_analysis());
//!
//! let retriever = SemanticRetriever::new(embedder, storage);
//! let results = retriever.search("bosque de noche").await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed
//! - `bundled-sqlite` (default): bundled SQLite
//! - `encryption`: SQLCipher instead of plain SQLite

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod embeddings;
pub mod emotion;
pub mod insight;
pub mod journal;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{ConfigError, JournalConfig};

pub use journal::{
    CreativeFormat, DreamPreview, DreamRecord, EmbeddedDream, Emotion, EmotionTag, MetricsRow,
    NewDream, PREVIEW_CHARS,
};

pub use llm::{GenerationOptions, LlmError, OpenAiGenerator, Prompt, TextGenerator};

pub use embeddings::{cosine_similarity, EmbeddingError, TextEmbedder};

#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub use embeddings::{FastEmbedder, EMBEDDING_DIMENSIONS};

pub use emotion::{interpret_label, EmotionClassifier};

pub use insight::{
    extract, extract_summary, render_analysis, Extraction, InsightSummary, Strategy,
    MAX_RAW_CHARS,
};

pub use pipeline::{
    CollaboratorError, DreamDraft, EnrichmentPipeline, PersistenceError, Submission,
    ValidationError,
};

pub use search::{rank_by_similarity, SearchError, SearchHit, SearchResults, SemanticRetriever};

pub use metrics::{DailyEmotions, EmotionCounts, MetricsAggregator, MetricsReport};

pub use storage::{DreamStore, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        CreativeFormat, DreamRecord, DreamStore, EmotionTag, EnrichmentPipeline, MetricsAggregator,
        SemanticRetriever, Storage, TextEmbedder, TextGenerator,
    };

    #[cfg(feature = "embeddings")]
    pub use crate::FastEmbedder;
}
