use serde_json::{Map, Value as JsonValue};
use sluice_core::types::{FileFormat, FileSource};

use super::{require, FetchFailure, FetchedPayload, Fetcher};

pub(super) async fn fetch(
    fetcher: &Fetcher,
    source: &FileSource,
) -> Result<FetchedPayload, FetchFailure> {
    let url = require(source.url.as_deref(), "url")?;
    let text = fetcher.get_text(url).await?;

    match source.format {
        FileFormat::Json => serde_json::from_str(&text)
            .map(FetchedPayload::Json)
            .map_err(|e| FetchFailure::Parse(e.to_string())),
        FileFormat::Csv => Ok(FetchedPayload::Json(JsonValue::Array(parse_csv(&text)))),
        FileFormat::Text => Ok(FetchedPayload::Text(text)),
    }
}

/// Splits on bare commas; quoted fields are not understood. The first
/// non-blank line names the columns. Short rows are padded with empty
/// strings and extra values are dropped.
pub fn parse_csv(text: &str) -> Vec<JsonValue> {
    let mut lines = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').collect();

    lines
        .map(|line| {
            let mut values = line.split(',');
            let mut row = Map::with_capacity(headers.len());
            for header in &headers {
                let value = values.next().unwrap_or("");
                row.insert((*header).to_string(), JsonValue::String(value.to_string()));
            }
            JsonValue::Object(row)
        })
        .collect()
}
