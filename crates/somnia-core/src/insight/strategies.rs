//! Extraction strategies
//!
//! Each function is pure and independent: given the raw analysis text it
//! either produces a summary or gives up. Ordering lives in the parent module.

use serde_json::Value;

use super::InsightSummary;

/// Accepted object keys, compared lowercase
pub const INTERPRETATION_KEYS: &[&str] = &["interpretation", "interpretación", "interpretacion"];
pub const ADVICE_KEYS: &[&str] = &["advice", "consejo", "recomendación", "recomendacion"];
pub const SYMBOL_KEYS: &[&str] = &["symbols", "símbolos", "simbolos"];

/// Line-scan keywords, matched against lowercased lines
pub const INTERPRETATION_KEYWORDS: &[&str] = &["interpret"];
pub const ADVICE_KEYWORDS: &[&str] = &["consejo", "advice", "recomend"];

// ============================================================================
// STRATEGIES
// ============================================================================

/// Parse the full text as strict JSON
pub(super) fn strict_json(text: &str) -> Option<InsightSummary> {
    parse_object(text.trim())
}

/// Parse the outermost `{...}` span
pub(super) fn braced_json(text: &str) -> Option<InsightSummary> {
    parse_object(braced_span(text)?)
}

/// Straighten curly quotes; swap single quotes for double quotes when they dominate
pub(super) fn normalized_quotes(text: &str) -> Option<InsightSummary> {
    parse_object(&normalize_quotes(braced_span(text)?))
}

/// Unescape `\"` once more on top of quote normalization
pub(super) fn unescaped(text: &str) -> Option<InsightSummary> {
    let normalized = normalize_quotes(braced_span(text)?);
    parse_object(&normalized.replace("\\\"", "\""))
}

/// Collect keyword-bearing lines into interpretation and advice buckets
pub(super) fn line_scan(text: &str) -> Option<InsightSummary> {
    let mut interpretation = Vec::new();
    let mut advice = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        if INTERPRETATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            interpretation.push(line);
        }
        if ADVICE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            advice.push(line);
        }
    }

    let summary = InsightSummary {
        symbols: Vec::new(),
        interpretation: interpretation.join(" "),
        advice: advice.join(" "),
    };
    (!summary.is_empty()).then_some(summary)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Greedy span from the first `{` to the last `}`
fn braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn normalize_quotes(candidate: &str) -> String {
    let straightened: String = candidate
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let singles = straightened.matches('\'').count();
    let doubles = straightened.matches('"').count();
    if singles > 0 && singles >= doubles {
        straightened.replace('\'', "\"")
    } else {
        straightened
    }
}

fn parse_object(candidate: &str) -> Option<InsightSummary> {
    let value: Value = serde_json::from_str(candidate).ok()?;
    let object = value.as_object()?;

    let mut summary = InsightSummary::default();
    for (key, value) in object {
        let key = key.trim().to_lowercase();
        let key = key.as_str();
        if INTERPRETATION_KEYS.contains(&key) && summary.interpretation.is_empty() {
            summary.interpretation = value_text(value);
        } else if ADVICE_KEYS.contains(&key) && summary.advice.is_empty() {
            summary.advice = value_text(value);
        } else if SYMBOL_KEYS.contains(&key) && summary.symbols.is_empty() {
            summary.symbols = value_list(value);
        }
    }

    (!summary.is_empty()).then_some(summary)
}

/// Flatten a field value into display text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn value_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
