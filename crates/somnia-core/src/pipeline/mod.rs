//! Enrichment Pipeline
//!
//! Turns one submitted dream into a persisted, enriched record:
//!
//! 1. validate title, content and creative format (no collaborator is called
//!    on invalid input)
//! 2. run emotion classification, creative generation, analysis generation
//!    and embedding concurrently; each step fails independently into a
//!    field-level sentinel
//! 3. persist every field in a single write once all four steps finish
//!
//! A persistence failure is reported separately and never discards the
//! generated text.

mod prompts;

pub use prompts::{
    ANALYSIS_OPTIONS, ANALYSIS_SYSTEM_PROMPT, CREATIVE_OPTIONS, CREATIVE_SYSTEM_PROMPT,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::embeddings::{EmbeddingError, TextEmbedder};
use crate::emotion::EmotionClassifier;
use crate::insight;
use crate::journal::{CreativeFormat, EmotionTag, NewDream};
use crate::llm::{LlmError, TextGenerator};
use crate::storage::{DreamStore, StorageError};

/// Stored in place of creative text when generation fails
pub const CREATIVE_ERROR_PREFIX: &str = "Error en generación creativa de IA: ";
/// Stored in place of the analysis when generation fails
pub const ANALYSIS_ERROR_PREFIX: &str = "Error en generación de análisis: ";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Input rejected before any collaborator call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Content cannot be empty")]
    EmptyContent,
    #[error("Unsupported creative format '{0}' (expected one of: poema, historia corta, guion corto)")]
    UnknownFormat(String),
}

/// A generation or embedding service failed for one step
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Text generation failed: {0}")]
    Generation(#[from] LlmError),
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// The store rejected the write
#[derive(Debug, thiserror::Error)]
#[error("Failed to save dream: {0}")]
pub struct PersistenceError(#[from] pub StorageError);

// ============================================================================
// SUBMISSION
// ============================================================================

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamDraft {
    pub title: String,
    pub content: String,
    pub format: CreativeFormat,
}

impl DreamDraft {
    /// Validate raw input. Title and content are trimmed; the format must be
    /// a member of the closed set.
    pub fn new(title: &str, content: &str, format: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        let format = format
            .parse::<CreativeFormat>()
            .map_err(|_| ValidationError::UnknownFormat(format.trim().to_string()))?;

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            format,
        })
    }
}

/// Everything a caller learns from one pipeline run
#[derive(Debug)]
pub struct Submission {
    pub draft: DreamDraft,
    pub emotion: EmotionTag,
    pub creative: Result<String, CollaboratorError>,
    pub analysis: Result<String, CollaboratorError>,
    pub embedding: Result<Vec<f32>, CollaboratorError>,
    /// Id of the persisted record
    pub saved: Result<i64, PersistenceError>,
}

impl Submission {
    /// Creative text as stored: generated text or the error sentinel
    pub fn creative_text(&self) -> String {
        step_text(&self.creative, CREATIVE_ERROR_PREFIX)
    }

    /// Raw analysis as stored: generated text or the error sentinel
    pub fn analysis_text(&self) -> String {
        step_text(&self.analysis, ANALYSIS_ERROR_PREFIX)
    }

    /// Analysis rendered through insight extraction
    pub fn rendered_analysis(&self) -> String {
        insight::render_analysis(&self.analysis_text())
    }

    pub fn record_id(&self) -> Option<i64> {
        self.saved.as_ref().ok().copied()
    }

    /// True when no collaborator step failed
    ///
    /// An unclassified emotion is a valid classifier outcome and still counts.
    pub fn fully_enriched(&self) -> bool {
        self.emotion != EmotionTag::ServiceError
            && self.creative.is_ok()
            && self.analysis.is_ok()
            && self.embedding.is_ok()
    }
}

fn step_text(step: &Result<String, CollaboratorError>, error_prefix: &str) -> String {
    match step {
        Ok(text) => text.clone(),
        Err(e) => format!("{}{}", error_prefix, e),
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct EnrichmentPipeline {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn DreamStore>,
    classifier: EmotionClassifier,
}

impl EnrichmentPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn DreamStore>,
    ) -> Self {
        let classifier = EmotionClassifier::new(Arc::clone(&generator));
        Self {
            generator,
            embedder,
            store,
            classifier,
        }
    }

    /// Validate, enrich and persist one dream
    pub async fn submit(
        &self,
        title: &str,
        content: &str,
        format: &str,
    ) -> Result<Submission, ValidationError> {
        let draft = DreamDraft::new(title, content, format)?;
        Ok(self.enrich(draft).await)
    }

    /// Enrich and persist an already validated draft
    pub async fn enrich(&self, draft: DreamDraft) -> Submission {
        let started = Instant::now();
        info!(title = %draft.title, format = %draft.format, "Enriching dream");

        let (emotion, creative, analysis, embedding) = tokio::join!(
            self.classifier.classify(&draft.content),
            self.generate_creative(&draft.content, draft.format),
            self.generate_analysis(&draft.content),
            self.generate_embedding(&draft.content),
        );

        let record = NewDream {
            title: draft.title.clone(),
            content: draft.content.clone(),
            emotion,
            creative_format: draft.format,
            creative_text: step_text(&creative, CREATIVE_ERROR_PREFIX),
            analysis_text: step_text(&analysis, ANALYSIS_ERROR_PREFIX),
            embedding: embedding.as_ref().ok().cloned(),
            embedding_model: embedding
                .as_ref()
                .ok()
                .map(|_| self.embedder.model_id().to_string()),
        };

        let saved = self.store.save(&record).map_err(PersistenceError::from);
        if let Err(e) = &saved {
            warn!(title = %draft.title, "{}", e);
        }

        info!(
            emotion = %emotion,
            creative_ok = creative.is_ok(),
            analysis_ok = analysis.is_ok(),
            embedding_ok = embedding.is_ok(),
            saved = saved.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Dream enrichment complete"
        );

        Submission {
            draft,
            emotion,
            creative,
            analysis,
            embedding,
            saved,
        }
    }

    async fn generate_creative(
        &self,
        content: &str,
        format: CreativeFormat,
    ) -> Result<String, CollaboratorError> {
        let prompt = prompts::creative_prompt(content, format);
        self.generator
            .generate(&prompt, &CREATIVE_OPTIONS)
            .await
            .map_err(|e| {
                warn!("Creative generation failed: {}", e);
                CollaboratorError::from(e)
            })
    }

    async fn generate_analysis(&self, content: &str) -> Result<String, CollaboratorError> {
        let prompt = prompts::analysis_prompt(content);
        self.generator
            .generate(&prompt, &ANALYSIS_OPTIONS)
            .await
            .map_err(|e| {
                warn!("Analysis generation failed: {}", e);
                CollaboratorError::from(e)
            })
    }

    async fn generate_embedding(&self, content: &str) -> Result<Vec<f32>, CollaboratorError> {
        let embedded = match self.embedder.embed(content).await {
            Ok(vector) if vector.is_empty() => Err(EmbeddingError::EmbeddingFailed(format!(
                "{} returned an empty vector",
                self.embedder.model_id()
            ))),
            other => other,
        };
        embedded.map_err(|e| {
            warn!("Embedding generation failed: {}", e);
            CollaboratorError::from(e)
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
