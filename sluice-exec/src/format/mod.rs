//! Serializes pipeline output. Formatting never fails.

mod csv;
mod rss;
mod xml;

use std::time::SystemTime;

use serde_json::Value as JsonValue;
use sluice_core::types::{OutputFormat, OutputSpec};

pub use csv::generate_csv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResponse {
    pub body: String,
    pub content_type: &'static str,
}

pub fn format(spec: &OutputSpec, data: &JsonValue) -> FormattedResponse {
    format_at(spec, data, SystemTime::now())
}

/// Like [`format`] with an explicit clock for RSS `lastBuildDate`.
pub fn format_at(spec: &OutputSpec, data: &JsonValue, now: SystemTime) -> FormattedResponse {
    let body = match spec.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        }
        OutputFormat::Xml => xml::generate_xml(data),
        OutputFormat::Rss => rss::generate_rss(data, &spec.metadata, now),
        OutputFormat::Csv => generate_csv(data),
    };
    FormattedResponse {
        body,
        content_type: spec.format.content_type(),
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Scalar text as it appears inside an element or cell.
pub(crate) fn scalar_text(v: &JsonValue) -> String {
    match v {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
