//! Turning free-form model output into structured insight.

use serde_json::Value;

const INSIGHT_TEXT_CHARS: usize = 500;
const MAX_EXTRACTED_LINES: usize = 5;
const RECOMMENDATION_MARKERS: &[&str] = &["recommend", "should", "suggest"];
const THEME_KEYWORDS: &[&str] = &["service", "quality", "price", "staff", "location", "atmosphere"];

/// A model reply, either as the JSON object it contained or as text with
/// heuristically extracted recommendation lines.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInsight {
    Structured(Value),
    Heuristic {
        text: String,
        extracted_lines: Vec<String>,
        themes: Vec<String>,
    },
}

impl ParsedInsight {
    /// Recommendation strings carried by the reply.
    ///
    /// For JSON replies this reads a top-level `recommendations` array; items
    /// may be plain strings or objects with a `recommendation`, `text`, or
    /// `title` field.
    #[must_use]
    pub fn recommendations(&self) -> Vec<String> {
        match self {
            ParsedInsight::Structured(value) => value
                .get("recommendations")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(recommendation_text).collect())
                .unwrap_or_default(),
            ParsedInsight::Heuristic {
                extracted_lines, ..
            } => extracted_lines.clone(),
        }
    }

    #[must_use]
    pub fn themes(&self) -> Vec<String> {
        match self {
            ParsedInsight::Structured(value) => value
                .get("themes")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_else(|| extract_themes(&value.to_string())),
            ParsedInsight::Heuristic { themes, .. } => themes.clone(),
        }
    }

    /// The narrative part of the reply: the JSON `insights` field when
    /// present, otherwise the whole JSON value or the truncated text.
    #[must_use]
    pub fn insights(&self) -> Value {
        match self {
            ParsedInsight::Structured(value) => value
                .get("insights")
                .cloned()
                .unwrap_or_else(|| value.clone()),
            ParsedInsight::Heuristic { text, .. } => Value::String(text.clone()),
        }
    }
}

fn recommendation_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["recommendation", "text", "title"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str)),
        _ => None,
    }?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse a model reply.
///
/// The outermost `{...}` span (after stripping code fences) is tried as
/// JSON; anything else becomes [`ParsedInsight::Heuristic`].
#[must_use]
pub fn parse_response(content: &str) -> ParsedInsight {
    let stripped = strip_code_blocks(content);
    if let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&stripped[start..=end]) {
                return ParsedInsight::Structured(value);
            }
        }
    }

    ParsedInsight::Heuristic {
        text: content.chars().take(INSIGHT_TEXT_CHARS).collect(),
        extracted_lines: extract_recommendation_lines(content),
        themes: extract_themes(content),
    }
}

fn extract_recommendation_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            RECOMMENDATION_MARKERS.iter().any(|m| lower.contains(m))
        })
        .map(|line| line.trim().to_string())
        .take(MAX_EXTRACTED_LINES)
        .collect()
}

fn extract_themes(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    THEME_KEYWORDS
        .iter()
        .filter(|theme| lower.contains(*theme))
        .map(|theme| (*theme).to_string())
        .collect()
}

/// Strip markdown code fences from a response.
#[must_use]
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
#[must_use]
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
