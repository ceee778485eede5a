//! Text Generation Module
//!
//! Narrow interface over a chat-style text-generation service. The rest of
//! the crate only sees [`TextGenerator`], so classification and enrichment
//! can be exercised against stubs without network access.

mod openai;

pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role-tagged prompt: a system instruction plus the user content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Sampling options for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
}

impl GenerationOptions {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(500, 0.7)
    }
}

/// Errors raised by a text-generation service
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// Text-generation collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &Prompt, options: &GenerationOptions)
        -> Result<String, LlmError>;
}
