use serde_json::Value as JsonValue;

use super::{escape_xml, scalar_text};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(super) fn generate_xml(data: &JsonValue) -> String {
    let mut out = String::from(DECLARATION);
    out.push('\n');
    match data {
        JsonValue::Array(items) => {
            out.push_str("<root>\n");
            write_items(&mut out, "item", items, 1);
            out.push_str("</root>\n");
        }
        other => write_element(&mut out, "root", other, 0),
    }
    out
}

fn write_element(out: &mut String, name: &str, value: &JsonValue, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        JsonValue::Null => {
            out.push_str(&format!("{indent}<{name}/>\n"));
        }
        JsonValue::Object(map) => {
            if map.is_empty() {
                out.push_str(&format!("{indent}<{name}/>\n"));
                return;
            }
            out.push_str(&format!("{indent}<{name}>\n"));
            for (key, child) in map {
                let child_name = sanitize_name(key);
                match child {
                    JsonValue::Array(items) => write_items(out, &child_name, items, depth + 1),
                    _ => write_element(out, &child_name, child, depth + 1),
                }
            }
            out.push_str(&format!("{indent}</{name}>\n"));
        }
        JsonValue::Array(items) => {
            out.push_str(&format!("{indent}<{name}>\n"));
            write_items(out, "item", items, depth + 1);
            out.push_str(&format!("{indent}</{name}>\n"));
        }
        scalar => {
            out.push_str(&format!(
                "{indent}<{name}>{}</{name}>\n",
                escape_xml(&scalar_text(scalar))
            ));
        }
    }
}

/// Repeats `name` once per item.
fn write_items(out: &mut String, name: &str, items: &[JsonValue], depth: usize) {
    for item in items {
        write_element(out, name, item, depth);
    }
}

/// Maps a JSON key onto a legal XML element name.
pub(super) fn sanitize_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match name.chars().next() {
        None => name.push('_'),
        Some(first) if first.is_ascii_digit() || first == '-' || first == '.' => {
            name.insert(0, '_')
        }
        Some(_) => {}
    }
    name
}
