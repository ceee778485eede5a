//! # Emotion Classification
//!
//! Maps dream text to one label of the fixed category set by asking the
//! text-generation service for exactly one category name, then recovering
//! from near-miss phrasing:
//!
//! 1. exact match of the trimmed response against a category label
//! 2. case-insensitive containment, categories tried in declaration order
//! 3. otherwise [`EmotionTag::Unclassified`]
//!
//! A transport failure yields [`EmotionTag::ServiceError`]; the classifier
//! never returns an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::journal::{Emotion, EmotionTag};
use crate::llm::{GenerationOptions, Prompt, TextGenerator};

/// Classification is a one-word answer
pub const CLASSIFY_OPTIONS: GenerationOptions = GenerationOptions::new(10, 0.1);

/// Ordered label-recovery strategies
const MATCHERS: &[fn(&str) -> Option<Emotion>] = &[exact_match, containment_match];

pub struct EmotionClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl EmotionClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify the dominant emotion of `text`
    pub async fn classify(&self, text: &str) -> EmotionTag {
        let prompt = Prompt::new(system_prompt(), text);

        match self.generator.generate(&prompt, &CLASSIFY_OPTIONS).await {
            Ok(raw) => {
                let tag = interpret_label(&raw);
                debug!(raw = %raw, emotion = %tag, "Emotion classified");
                tag
            }
            Err(e) => {
                warn!("Emotion classification failed: {}", e);
                EmotionTag::ServiceError
            }
        }
    }
}

fn system_prompt() -> String {
    let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.label()).collect();
    format!(
        "Eres un analista de sueños profesional. Tu única tarea es leer el sueño \
         y clasificar la emoción principal que domina en el texto. \
         Debes responder ÚNICAMENTE con una de estas categorías: {}. \
         No incluyas explicaciones ni texto adicional.",
        labels.join(", ")
    )
}

/// Turn a raw generated label into a tag
pub fn interpret_label(raw: &str) -> EmotionTag {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(raw))
        .map(EmotionTag::Category)
        .unwrap_or(EmotionTag::Unclassified)
}

fn exact_match(raw: &str) -> Option<Emotion> {
    Emotion::from_label(raw.trim())
}

fn containment_match(raw: &str) -> Option<Emotion> {
    let lower = raw.to_lowercase();
    Emotion::ALL
        .into_iter()
        .find(|e| lower.contains(&e.label().to_lowercase()))
}
