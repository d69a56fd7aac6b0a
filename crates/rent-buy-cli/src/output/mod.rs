pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar cell; nested values fall back to compact JSON.
pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The row list of an envelope: `result` when it is an array, else `results`.
pub(crate) fn rows_of(map: &serde_json::Map<String, Value>) -> Option<&[Value]> {
    match (map.get("result"), map.get("results")) {
        (Some(Value::Array(rows)), _) | (_, Some(Value::Array(rows))) => Some(rows.as_slice()),
        _ => None,
    }
}
