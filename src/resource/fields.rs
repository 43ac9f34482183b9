//! Display fields
//!
//! Turns resources into table cells using the column definitions from the
//! registry, including fields derived at render time.

use super::registry::ColumnDef;
use super::Resource;
use serde_json::Value;

/// Placeholder for a value that isn't there
pub const EMPTY_CELL: &str = "-";

/// Cell values for one resource, in column order
pub fn row(resource: &Resource, columns: &[ColumnDef]) -> Vec<String> {
    columns
        .iter()
        .map(|c| display_value(resource, &c.json_path))
        .collect()
}

/// Display value for one column path. `id` and derived fields are always
/// available; everything else needs a loaded representation.
pub fn display_value(resource: &Resource, path: &str) -> String {
    match path {
        "id" => resource.id().to_string(),
        "created_on" => created_on(resource),
        _ => match resource.attribute(path) {
            Ok(Some(value)) => format_value(value),
            _ => EMPTY_CELL.to_string(),
        },
    }
}

fn created_on(resource: &Resource) -> String {
    if let Ok(date) = resource.created_on() {
        return date;
    }
    // Non-RFC 3339 timestamps still start with the date
    match resource.attribute_str("created_at") {
        Ok(Some(raw)) => format_timestamp_short(raw),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Format timestamp to short form
fn format_timestamp_short(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_string()
}

/// Render a JSON value as a single cell
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => EMPTY_CELL.to_string(),
        Value::Array(arr) => format_list(arr),
        Value::Object(map) => map
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| "[object]".to_string()),
    }
}

/// Lists of nested resources show their ids, anything else its length
fn format_list(items: &[Value]) -> String {
    let ids: Vec<&str> = items
        .iter()
        .filter_map(|v| v.get("id").and_then(|id| id.as_str()))
        .collect();

    if items.is_empty() {
        EMPTY_CELL.to_string()
    } else if ids.len() == items.len() {
        ids.join(", ")
    } else {
        format!("[{} items]", items.len())
    }
}
