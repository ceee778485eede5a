//! Structured Insight Extraction
//!
//! Generated analyses are supposed to be a JSON object with `symbols`,
//! `interpretation` and `advice`, but what comes back is routinely wrapped in
//! prose, fenced in markdown, single-quoted, curly-quoted, double-escaped or
//! keyed in Spanish. Extraction runs an ordered cascade of strategies and the
//! first one that yields an interpretation or advice wins:
//!
//! 1. strict JSON over the whole text
//! 2. strict JSON over the outermost `{...}` span
//! 3. the same span with quotes normalized
//! 4. the normalized span with escaped quotes unescaped once more
//! 5. a line scan collecting interpretation/advice keyword lines
//!
//! When every strategy fails, rendering falls back to the raw text,
//! truncated to [`MAX_RAW_CHARS`]. Nothing in this module returns an error.

mod strategies;

use serde::{Deserialize, Serialize};

use crate::journal::truncate_chars;

pub use strategies::{
    ADVICE_KEYS, ADVICE_KEYWORDS, INTERPRETATION_KEYS, INTERPRETATION_KEYWORDS, SYMBOL_KEYS,
};

/// Raw fallback output is cut at this many characters
pub const MAX_RAW_CHARS: usize = 2000;

/// Appended to truncated raw output
pub const TRUNCATION_MARKER: &str = "… [truncado]";

const INTERPRETATION_HEADING: &str = "Interpretación:";
const ADVICE_HEADING: &str = "Consejo:";

/// Insight recovered from an analysis. Derived on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub symbols: Vec<String>,
    pub interpretation: String,
    pub advice: String,
}

impl InsightSummary {
    /// True when neither interpretation nor advice was recovered
    pub fn is_empty(&self) -> bool {
        self.interpretation.is_empty() && self.advice.is_empty()
    }

    /// Render present fields as headed paragraphs separated by a blank line
    pub fn render(&self) -> String {
        let mut paragraphs = Vec::with_capacity(2);
        if !self.interpretation.is_empty() {
            paragraphs.push(format!("{}\n{}", INTERPRETATION_HEADING, self.interpretation));
        }
        if !self.advice.is_empty() {
            paragraphs.push(format!("{}\n{}", ADVICE_HEADING, self.advice));
        }
        paragraphs.join("\n\n")
    }
}

/// Which cascade step produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StrictJson,
    BracedJson,
    NormalizedQuotes,
    Unescaped,
    LineScan,
}

/// A successful extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub strategy: Strategy,
    pub summary: InsightSummary,
}

/// The cascade, in evaluation order
const CASCADE: &[(Strategy, fn(&str) -> Option<InsightSummary>)] = &[
    (Strategy::StrictJson, strategies::strict_json),
    (Strategy::BracedJson, strategies::braced_json),
    (Strategy::NormalizedQuotes, strategies::normalized_quotes),
    (Strategy::Unescaped, strategies::unescaped),
    (Strategy::LineScan, strategies::line_scan),
];

/// Run the cascade and report the winning strategy
pub fn extract(text: &str) -> Option<Extraction> {
    CASCADE.iter().find_map(|(strategy, attempt)| {
        attempt(text)
            .filter(|summary| !summary.is_empty())
            .map(|summary| Extraction {
                strategy: *strategy,
                summary,
            })
    })
}

/// Run the cascade, keeping only the summary
pub fn extract_summary(text: &str) -> Option<InsightSummary> {
    extract(text).map(|e| e.summary)
}

/// Render an analysis for display: structured paragraphs when any strategy
/// succeeds, otherwise the raw text (truncated with a marker when long)
pub fn render_analysis(text: &str) -> String {
    match extract(text) {
        Some(extraction) => {
            tracing::debug!(strategy = ?extraction.strategy, "Insight extracted");
            extraction.summary.render()
        }
        None => truncate_raw(text),
    }
}

fn truncate_raw(text: &str) -> String {
    let kept = truncate_chars(text, MAX_RAW_CHARS);
    if kept.len() == text.len() {
        text.to_string()
    } else {
        format!("{}{}", kept, TRUNCATION_MARKER)
    }
}

// ============================================================================
// TESTS
// ============================================================================
