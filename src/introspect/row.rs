//! Loosely typed catalog rows and the accessors that read them.
//!
//! Drivers disagree on key case and on how booleans and counts come back
//! (`true`, `1`, `'YES'`, `"3"`), so every read goes through these helpers.

use serde_json::Value;

/// One catalog result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Look up `key` exactly, then case-insensitively. SQL `NULL` reads as absent.
pub fn value<'a>(row: &'a Row, key: &str) -> Option<&'a Value> {
    let found = row.get(key).or_else(|| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });
    found.filter(|v| !v.is_null())
}

/// Read a value as text. Numbers and booleans are rendered with `to_string`.
pub fn text(row: &Row, key: &str) -> Option<String> {
    match value(row, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a value as text, treating blank strings as absent.
pub fn non_empty(row: &Row, key: &str) -> Option<String> {
    text(row, key).filter(|s| !s.trim().is_empty())
}

pub fn flag(row: &Row, key: &str) -> bool {
    match value(row, key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_uppercase().as_str(),
            "YES" | "Y" | "TRUE" | "T" | "1"
        ),
        _ => false,
    }
}

pub fn int(row: &Row, key: &str) -> Option<i64> {
    match value(row, key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Read a list of strings from a JSON array or a PostgreSQL array literal (`{a,b}`).
pub fn list(row: &Row, key: &str) -> Vec<String> {
    match value(row, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => {
            let inner = s.trim().trim_start_matches('{').trim_end_matches('}');
            inner
                .split(',')
                .map(|item| item.trim().trim_matches('"').to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }
        _ => Vec::new(),
    }
}
