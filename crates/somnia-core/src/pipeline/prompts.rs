//! Prompt templates for the generation steps

use crate::journal::CreativeFormat;
use crate::llm::{GenerationOptions, Prompt};

pub const CREATIVE_SYSTEM_PROMPT: &str = "Eres un artista y escritor creativo.";

pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "Eres experto en interpretación de sueños, claro y empático.";

pub const CREATIVE_OPTIONS: GenerationOptions = GenerationOptions::new(500, 0.8);

pub const ANALYSIS_OPTIONS: GenerationOptions = GenerationOptions::new(300, 0.6);

pub(super) fn creative_prompt(content: &str, format: CreativeFormat) -> Prompt {
    Prompt::new(
        CREATIVE_SYSTEM_PROMPT,
        format!(
            "Basándote en el siguiente texto de un sueño: '{}', por favor, {} \
             que capture la esencia y las emociones del sueño.",
            content,
            format.task()
        ),
    )
}

pub(super) fn analysis_prompt(content: &str) -> Prompt {
    Prompt::new(
        ANALYSIS_SYSTEM_PROMPT,
        format!(
            "Eres un intérprete de sueños profesional y conciso. \
             Lee el siguiente texto de un sueño y devuelve: \
             (1) una lista corta de símbolos importantes (máx 6), \
             (2) una interpretación clara y breve del significado emocional o temático, \
             y (3) un consejo práctico o reflexión para la persona (1 oración). \
             Responde en formato JSON con claves: symbols, interpretation, advice. \
             Texto del sueño: '''{}'''",
            content
        ),
    )
}
