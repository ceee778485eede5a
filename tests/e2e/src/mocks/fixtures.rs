//! Test Data Factory
//!
//! Fixture dreams and the kinds of malformed analyses generation services
//! actually return.

use somnia_core::{
    CreativeFormat, DreamStore, EmotionTag, EnrichmentPipeline, NewDream, Storage, Submission,
};

/// (title, content, creative format)
pub const SAMPLE_DREAMS: &[(&str, &str, &str)] = &[
    (
        "Lobos en el bosque",
        "Corría por un bosque oscuro mientras una manada de lobos me perseguía entre los árboles",
        "poema",
    ),
    (
        "Vuelo sobre la ciudad",
        "Volaba feliz sobre tejados iluminados, sintiendo el viento cálido del verano",
        "historia corta",
    ),
    (
        "Casa inundada",
        "El agua subía lentamente dentro de la casa de mi infancia y nadie respondía",
        "guion corto",
    ),
];

/// (raw analysis, expected rendering)
pub const MESSY_ANALYSES: &[(&str, &str)] = &[
    (
        r#"{"interpretation": "X", "advice": "Y"}"#,
        "Interpretación:\nX\n\nConsejo:\nY",
    ),
    (
        "{'interpretation': 'X', 'advice': 'Y'}",
        "Interpretación:\nX\n\nConsejo:\nY",
    ),
    (
        "Claro, aquí está:\n```json\n{\"interpretación\": \"Miedo al cambio\", \"consejo\": \"Descansa\"}\n```",
        "Interpretación:\nMiedo al cambio\n\nConsejo:\nDescansa",
    ),
    (
        "{“interpretation”: “Búsqueda”, “advice”: “Camina”}",
        "Interpretación:\nBúsqueda\n\nConsejo:\nCamina",
    ),
    (
        "{\"advice\": \"Solo esto\"}",
        "Consejo:\nSolo esto",
    ),
];

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    /// Run every sample dream through the pipeline, in order
    pub async fn record_samples(pipeline: &EnrichmentPipeline) -> Vec<Submission> {
        let mut submissions = Vec::with_capacity(SAMPLE_DREAMS.len());
        for (title, content, format) in SAMPLE_DREAMS {
            let submission = pipeline
                .submit(title, content, format)
                .await
                .expect("sample dreams are valid");
            submissions.push(submission);
        }
        submissions
    }

    /// Store a dream directly, bypassing enrichment
    pub fn seed(storage: &Storage, emotion: EmotionTag, content: &str) -> i64 {
        storage
            .save(&NewDream {
                title: content.chars().take(20).collect(),
                content: content.to_string(),
                emotion,
                creative_format: CreativeFormat::Poem,
                creative_text: String::new(),
                analysis_text: String::new(),
                embedding: None,
                embedding_model: None,
            })
            .expect("Failed to seed dream")
    }
}
