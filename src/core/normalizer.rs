use crate::domain::model::{ContactRecord, UntypedRecord, SCHEMA};
use serde_json::Value;

/// Strings the model uses in place of a JSON null.
const NULL_LIKE: &[&str] = &["null", "None"];

/// Projects an untyped record onto the schema. Never fails: missing, null and
/// null-like values become empty strings and unknown keys are dropped.
pub fn normalize(record: &UntypedRecord) -> ContactRecord {
    let values = SCHEMA.map(|field| record.get(field.key()).map(render).unwrap_or_default());
    ContactRecord::from_values(values)
}

pub fn normalize_all(records: &[UntypedRecord]) -> Vec<ContactRecord> {
    records.iter().map(normalize).collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => {
            let trimmed = s.trim();
            if NULL_LIKE.contains(&trimmed) {
                String::new()
            } else {
                trimmed.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
