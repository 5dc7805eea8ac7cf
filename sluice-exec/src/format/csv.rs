use serde_json::Value as JsonValue;

use super::scalar_text;

/// Header row from the first element's keys, then one row per element.
/// Empty or non-array input produces an empty body.
pub fn generate_csv(data: &JsonValue) -> String {
    let Some(items) = data.as_array() else {
        return String::new();
    };
    let Some(JsonValue::Object(first)) = items.first() else {
        return String::new();
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| escape_cell(h)));
    for item in items {
        push_row(
            &mut out,
            headers.iter().map(|h| escape_cell(&cell_text(item.get(*h)))),
        );
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let line: Vec<String> = cells.collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn cell_text(value: Option<&JsonValue>) -> String {
    match value {
        None => String::new(),
        Some(v @ (JsonValue::Array(_) | JsonValue::Object(_))) => v.to_string(),
        Some(v) => scalar_text(v),
    }
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
