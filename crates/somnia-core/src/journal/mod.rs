//! Journal module - Core types and data structures
//!
//! Implements the dream journal data model with:
//! - Dream records enriched with emotion, creative text, analysis and embedding
//! - The closed emotion category set plus its sentinels
//! - The closed set of creative formats

mod dream;

pub use dream::{DreamPreview, DreamRecord, EmbeddedDream, MetricsRow, NewDream, PREVIEW_CHARS};
pub(crate) use dream::truncate_chars;

use serde::{Deserialize, Serialize};

// ============================================================================
// EMOTION CATEGORIES
// ============================================================================

/// The fixed emotion category set, in declaration order
///
/// Declaration order matters: the classifier's containment fallback returns
/// the first category whose label appears in the generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Fear,
    Anger,
    Calm,
}

impl Emotion {
    /// All categories in declaration order
    pub const ALL: [Emotion; 5] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Calm,
    ];

    /// Stored and displayed label
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Joy => "Alegría",
            Emotion::Sadness => "Tristeza",
            Emotion::Fear => "Miedo",
            Emotion::Anger => "Ira",
            Emotion::Calm => "Calma",
        }
    }

    /// Exact label match
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Emotion tag attached to a dream: a category or a sentinel
///
/// Serializes as its stored label (`"Miedo"`, `"Indefinida"`, `"Error_IA"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionTag {
    /// One of the fixed categories
    Category(Emotion),
    /// The generated label matched no category
    Unclassified,
    /// The text-generation service failed
    ServiceError,
}

impl EmotionTag {
    pub const UNCLASSIFIED_LABEL: &'static str = "Indefinida";
    pub const SERVICE_ERROR_LABEL: &'static str = "Error_IA";

    /// Stored and displayed label
    pub fn label(&self) -> &'static str {
        match self {
            EmotionTag::Category(e) => e.label(),
            EmotionTag::Unclassified => Self::UNCLASSIFIED_LABEL,
            EmotionTag::ServiceError => Self::SERVICE_ERROR_LABEL,
        }
    }

    /// Parse a stored label. Returns `None` for anything outside the closed set.
    pub fn parse_label(label: &str) -> Option<Self> {
        if let Some(e) = Emotion::from_label(label) {
            return Some(EmotionTag::Category(e));
        }
        match label {
            Self::UNCLASSIFIED_LABEL => Some(EmotionTag::Unclassified),
            Self::SERVICE_ERROR_LABEL => Some(EmotionTag::ServiceError),
            _ => None,
        }
    }

    /// The category, if this is not a sentinel
    pub fn category(&self) -> Option<Emotion> {
        match self {
            EmotionTag::Category(e) => Some(*e),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.category().is_none()
    }
}

impl From<Emotion> for EmotionTag {
    fn from(e: Emotion) -> Self {
        EmotionTag::Category(e)
    }
}

impl std::fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for EmotionTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for EmotionTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        EmotionTag::parse_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown emotion label '{}'", label)))
    }
}

// ============================================================================
// CREATIVE FORMATS
// ============================================================================

/// Creative rewrite formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeFormat {
    Poem,
    ShortStory,
    ShortScript,
}

impl CreativeFormat {
    pub const ALL: [CreativeFormat; 3] = [
        CreativeFormat::Poem,
        CreativeFormat::ShortStory,
        CreativeFormat::ShortScript,
    ];

    /// Canonical name, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            CreativeFormat::Poem => "poema",
            CreativeFormat::ShortStory => "historia corta",
            CreativeFormat::ShortScript => "guion corto",
        }
    }

    /// Writing task handed to the generator for this format
    pub fn task(&self) -> &'static str {
        match self {
            CreativeFormat::Poem => "Escribe un poema lírico y reflexivo de 8-10 líneas",
            CreativeFormat::ShortStory => "Escribe una historia corta y surrealista de 150 palabras",
            CreativeFormat::ShortScript => {
                "Escribe un guion corto (una escena de 1 minuto) con formato de diálogos y acciones"
            }
        }
    }
}

impl std::fmt::Display for CreativeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CreativeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| format!("Unknown creative format: {}", s))
    }
}

// ============================================================================
// TESTS
// ============================================================================
