use crate::domain::model::UntypedRecord;
use crate::utils::error::{Result, ScanError};
use serde_json::Value;

const FENCE: &str = "```";

/// Removes a surrounding Markdown code fence and its language tag, if present.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            // Single-line form: ```json{...}```
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Decodes a model answer into untyped records.
///
/// Accepts a single JSON object or a list of objects. Anything else, including a
/// syntax error anywhere in the payload, rejects the whole answer with the raw text
/// attached.
pub fn parse_response(raw: &str) -> Result<Vec<UntypedRecord>> {
    let payload = strip_fences(raw);

    let value: Value = serde_json::from_str(payload).map_err(|e| malformed(raw, e.to_string()))?;

    match value {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(malformed(
                    raw,
                    format!("element {} is {}, expected an object", index, kind(&other)),
                )),
            })
            .collect(),
        other => Err(malformed(
            raw,
            format!("top-level {} is neither an object nor a list", kind(&other)),
        )),
    }
}

fn malformed(raw: &str, reason: String) -> ScanError {
    tracing::debug!("Rejecting model response: {}", reason);
    ScanError::MalformedResponse {
        reason,
        raw: raw.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
