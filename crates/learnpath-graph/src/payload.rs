//! Parsing of related-topic responses.
//!
//! Sources answer in one of a few shapes:
//!
//! - a bare array of names: `["a", "b"]`
//! - an object with names: `{"relatedTopics": ["a", "b"]}`
//! - an object with scored names: `{"relatedTopics": [{"name": "a", "relevanceScore": 8}]}`
//!
//! optionally wrapped in a markdown code fence or surrounded by prose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;

/// A name with a score already assigned by the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredName {
    pub name: String,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: f64,
}

/// A successfully classified response.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedTopicsPayload {
    /// Names only; scores are computed locally
    BareArray(Vec<String>),
    /// Names with source-provided relevance scores
    ScoredArray(Vec<ScoredName>),
}

impl RelatedTopicsPayload {
    /// Number of topics in the payload.
    pub fn len(&self) -> usize {
        match self {
            RelatedTopicsPayload::BareArray(names) => names.len(),
            RelatedTopicsPayload::ScoredArray(scored) => scored.len(),
        }
    }

    /// True when the payload holds no topics.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extract the JSON document from text (handles markdown code blocks and
/// leading/trailing prose).
pub fn extract_json(text: &str) -> &str {
    // Check for markdown code block
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim();
        }
    }

    // Check for plain code block
    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim();
        }
    }

    // First bracket that starts a complete JSON value
    for (start, c) in text.char_indices() {
        if c != '{' && c != '[' {
            continue;
        }
        let rest = &text[start..];
        let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
        if let Some(Ok(_)) = values.next() {
            return &rest[..values.byte_offset()];
        }
    }

    // Nothing parses; span from the first opening bracket to the last closing one
    let open = [text.find('{'), text.find('[')].into_iter().flatten().min();
    let close = [text.rfind('}'), text.rfind(']')].into_iter().flatten().max();
    if let (Some(start), Some(end)) = (open, close) {
        if start < end {
            return &text[start..=end];
        }
    }

    text.trim()
}

/// Parse a raw response body into a payload.
///
/// Returns `GraphError::MalformedResponse` when the body is not JSON, the
/// topic array is missing or not an array, is empty, mixes strings and
/// objects, or contains blank names or non-numeric scores.
pub fn parse_payload(raw: &str) -> Result<RelatedTopicsPayload, GraphError> {
    let json = extract_json(raw);
    let value: Value = serde_json::from_str(json)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("relatedTopics") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(GraphError::MalformedResponse(format!(
                    "relatedTopics is not an array: {}",
                    other
                )))
            }
            None => {
                return Err(GraphError::MalformedResponse(
                    "expected an array or an object with relatedTopics".to_string(),
                ))
            }
        },
        other => {
            return Err(GraphError::MalformedResponse(format!(
                "unexpected JSON value: {}",
                other
            )))
        }
    };

    classify(items)
}

fn classify(items: Vec<Value>) -> Result<RelatedTopicsPayload, GraphError> {
    if items.is_empty() {
        return Err(GraphError::MalformedResponse(
            "topic array is empty".to_string(),
        ));
    }

    if items.iter().all(Value::is_string) {
        let names = items
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .collect::<Vec<_>>();
        if names.iter().any(String::is_empty) {
            return Err(GraphError::MalformedResponse(
                "blank topic name".to_string(),
            ));
        }
        return Ok(RelatedTopicsPayload::BareArray(names));
    }

    if items.iter().all(Value::is_object) {
        let mut scored = Vec::with_capacity(items.len());
        for item in items {
            let mut entry: ScoredName = serde_json::from_value(item)?;
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                return Err(GraphError::MalformedResponse(
                    "blank topic name".to_string(),
                ));
            }
            scored.push(entry);
        }
        return Ok(RelatedTopicsPayload::ScoredArray(scored));
    }

    Err(GraphError::MalformedResponse(
        "topic array mixes names and objects".to_string(),
    ))
}
