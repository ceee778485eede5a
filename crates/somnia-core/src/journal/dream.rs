//! Dream Record - The fundamental unit of the journal
//!
//! Each record holds:
//! - The submitted title and content
//! - AI enrichment (emotion tag, creative rewrite, raw analysis text)
//! - The content embedding and the model that produced it

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CreativeFormat, EmotionTag};
use crate::insight::{self, InsightSummary};

/// Characters kept in list previews
pub const PREVIEW_CHARS: usize = 300;

// ============================================================================
// DREAM RECORD
// ============================================================================

/// A persisted, enriched dream
///
/// Records are written once and never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamRecord {
    /// Row id assigned on persist
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Assigned by storage at save time
    pub date_recorded: DateTime<Utc>,
    pub emotion: EmotionTag,
    pub creative_format: CreativeFormat,
    pub creative_text: String,
    /// Raw generated analysis, usually loosely structured JSON
    pub analysis_text: String,
    /// Content embedding; `None` when embedding generation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Which model generated the embedding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

impl DreamRecord {
    /// Structured insight recovered from the raw analysis, if any strategy succeeds
    pub fn insight(&self) -> Option<InsightSummary> {
        insight::extract_summary(&self.analysis_text)
    }

    /// Analysis rendered for display. Never fails.
    pub fn rendered_analysis(&self) -> String {
        insight::render_analysis(&self.analysis_text)
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|v| !v.is_empty())
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// A fully enriched dream, ready to be written in a single insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewDream {
    pub title: String,
    pub content: String,
    pub emotion: EmotionTag,
    pub creative_format: CreativeFormat,
    pub creative_text: String,
    pub analysis_text: String,
    pub embedding: Option<Vec<f32>>,
    pub embedding_model: Option<String>,
}

// ============================================================================
// READ MODELS
// ============================================================================

/// List entry with truncated text fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamPreview {
    pub id: i64,
    pub title: String,
    /// Content truncated to [`PREVIEW_CHARS`]
    pub preview: String,
    pub date_recorded: DateTime<Utc>,
    pub emotion: EmotionTag,
    pub creative_format: CreativeFormat,
    pub creative_preview: String,
    pub analysis_preview: String,
}

/// One row of the reporting feed
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub date_recorded: DateTime<Utc>,
    pub emotion: EmotionTag,
    pub content: String,
}

/// Retrieval candidate: enough to rank and display a hit
#[derive(Debug, Clone)]
pub struct EmbeddedDream {
    pub id: i64,
    pub title: String,
    pub date_recorded: DateTime<Utc>,
    pub emotion: EmotionTag,
    pub embedding: Option<Vec<f32>>,
    pub embedding_model: Option<String>,
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
