//! One fetcher per source kind, sharing a transport and a result shape.

mod api;
mod database;
mod file;
mod rss;

use std::sync::Arc;

use base64::Engine as _;
use serde_json::{json, Value as JsonValue};
use sluice_core::error::PathError;
use sluice_core::types::{ResolvedSource, RuntimeParameters, SourceSpec};
use sluice_store::{DatabaseClient, StoreError};

use crate::config::FetchSettings;
use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};

pub use file::parse_csv;
pub use rss::parse_rss_items;

#[derive(Debug, thiserror::Error)]
#[error("source '{source_name}' failed: {cause}")]
pub struct SourceFetchError {
    pub source_name: String,
    #[source]
    pub cause: FetchFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("missing required config field '{field}'")]
    MissingConfig { field: &'static str },
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("failed to read file: {0}")]
    Read(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Database(#[from] StoreError),
    #[error("no database client configured")]
    NoDatabaseClient,
}

/// A source's result before it is placed in the merged data bag.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedPayload {
    Json(JsonValue),
    Text(String),
    Binary { content_type: String, bytes: Vec<u8> },
}

impl FetchedPayload {
    pub fn into_json(self) -> JsonValue {
        match self {
            Self::Json(v) => v,
            Self::Text(s) => JsonValue::String(s),
            Self::Binary {
                content_type,
                bytes,
            } => json!({
                "contentType": content_type,
                "byteLength": bytes.len(),
                "base64": base64::engine::general_purpose::STANDARD.encode(&bytes),
            }),
        }
    }
}

pub struct Fetcher {
    http: Arc<dyn HttpClient>,
    database: Option<Arc<dyn DatabaseClient>>,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(http: Arc<dyn HttpClient>, settings: FetchSettings) -> Self {
        Self {
            http,
            database: None,
            settings,
        }
    }

    pub fn with_database(mut self, database: Arc<dyn DatabaseClient>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub async fn fetch(
        &self,
        source: &ResolvedSource,
        runtime: &RuntimeParameters,
    ) -> Result<FetchedPayload, SourceFetchError> {
        tracing::debug!(source = %source.key, kind = source.spec.source_type().as_str(), "fetching source");
        let result = match &source.spec {
            SourceSpec::Api(api) => api::fetch(self, api, runtime).await,
            SourceSpec::Database(db) => database::fetch(self, db).await,
            SourceSpec::Rss(rss) => rss::fetch(self, rss).await,
            SourceSpec::File(file) => file::fetch(self, file).await,
        };
        result.map_err(|cause| SourceFetchError {
            source_name: source.name.clone(),
            cause,
        })
    }

    async fn send(&self, req: HttpRequestParts) -> Result<HttpResponseParts, FetchFailure> {
        let resp = self
            .http
            .send(req, self.settings.timeout, self.settings.max_response_bytes)
            .await?;
        if !resp.is_success() {
            return Err(FetchFailure::Status {
                status: resp.status,
                body: truncate_utf8(&resp.body, self.settings.diagnostic_body_bytes),
            });
        }
        Ok(resp)
    }

    /// Reads a text resource from `http(s)://`, or from `file://` when the
    /// settings allow local files.
    async fn get_text(&self, raw_url: &str) -> Result<String, FetchFailure> {
        let url = parse_url(raw_url, self.settings.allow_file_urls)?;
        if url.scheme() == "file" {
            return read_local(&url, self.settings.max_response_bytes).await;
        }
        let resp = self.send(HttpRequestParts::get(url)).await?;
        Ok(String::from_utf8_lossy(&resp.body).into_owned())
    }
}

pub(crate) fn parse_url(raw: &str, allow_file: bool) -> Result<url::Url, FetchFailure> {
    let url = url::Url::parse(raw.trim()).map_err(|e| FetchFailure::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        "file" if allow_file => Ok(url),
        "file" => Err(FetchFailure::InvalidUrl {
            url: raw.to_string(),
            message: "local file URLs are disabled".to_string(),
        }),
        other => Err(FetchFailure::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}

pub(crate) fn require<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, FetchFailure> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(FetchFailure::MissingConfig { field })
}

async fn read_local(url: &url::Url, max_bytes: usize) -> Result<String, FetchFailure> {
    let path = url.to_file_path().map_err(|()| FetchFailure::InvalidUrl {
        url: url.to_string(),
        message: "not a local file path".to_string(),
    })?;
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|e| FetchFailure::Read(format!("{}: {e}", path.display())))?;
    if meta.len() > max_bytes as u64 {
        return Err(HttpError::ResponseTooLarge { max_bytes }.into());
    }
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| FetchFailure::Read(format!("{}: {e}", path.display())))
}

/// Lossy UTF-8 rendering cut to at most `max_bytes` on a char boundary.
pub(crate) fn truncate_utf8(bytes: &[u8], max_bytes: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= max_bytes {
        return text.into_owned();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_utf8(b"hello", 10), "hello");
        assert_eq!(truncate_utf8(b"hello", 3), "hel");
        assert_eq!(truncate_utf8("h\u{e9}llo".as_bytes(), 2), "h");
    }

    #[test]
    fn binary_payload_renders_as_base64_object() {
        let payload = FetchedPayload::Binary {
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(
            payload.into_json(),
            json!({"contentType": "image/png", "byteLength": 3, "base64": "AQID"})
        );
    }

    #[test]
    fn rejects_unsupported_schemes() {
        assert!(matches!(
            parse_url("ftp://example.com/x", true),
            Err(FetchFailure::InvalidUrl { .. })
        ));
        assert!(parse_url("not a url", true).is_err());
        assert!(parse_url(" https://example.com ", false).is_ok());
    }

    #[test]
    fn file_urls_need_opt_in() {
        assert!(matches!(
            parse_url("file:///etc/passwd", false),
            Err(FetchFailure::InvalidUrl { .. })
        ));
        assert!(parse_url("file:///etc/passwd", true).is_ok());
    }
}
