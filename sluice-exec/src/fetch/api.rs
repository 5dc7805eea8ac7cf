use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use sluice_core::navigate_indexed;
use sluice_core::types::{ApiSource, RuntimeParameters};

use super::{parse_url, require, FetchFailure, FetchedPayload, Fetcher};
use crate::http::{HttpRequestParts, HttpResponseParts};

pub(super) async fn fetch(
    fetcher: &Fetcher,
    api: &ApiSource,
    runtime: &RuntimeParameters,
) -> Result<FetchedPayload, FetchFailure> {
    let endpoint = require(api.endpoint.as_deref(), "endpoint")?;
    let req = build_request(endpoint, api, runtime)?;
    tracing::debug!(method = %req.method, url = %req.url, "api request");

    let resp = fetcher.send(req).await?;
    let payload = decode_body(resp)?;

    match api.data_path.as_deref().filter(|p| !p.is_empty()) {
        None => Ok(payload),
        Some(path) => {
            let value = payload.into_json();
            let selected = navigate_indexed(&value, path)?
                .cloned()
                .unwrap_or(JsonValue::Null);
            Ok(FetchedPayload::Json(selected))
        }
    }
}

pub(super) fn build_request(
    endpoint: &str,
    api: &ApiSource,
    runtime: &RuntimeParameters,
) -> Result<HttpRequestParts, FetchFailure> {
    let mut url = parse_url(endpoint, false)?;

    let method = runtime
        .method
        .as_deref()
        .or(api.method.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_ascii_uppercase();

    if method == "GET" && !runtime.params.is_empty() {
        url.query_pairs_mut().extend_pairs(runtime.params.iter());
    }

    let mut headers = merge_headers(&api.headers, &runtime.headers);

    let mut body = Vec::new();
    if method != "GET" {
        if let Some(payload) = &runtime.body {
            body = serde_json::to_vec(payload).map_err(|e| FetchFailure::Parse(e.to_string()))?;
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
        }
    }

    Ok(HttpRequestParts {
        method,
        url,
        headers,
        body,
    })
}

/// Source headers overlaid with runtime headers; names compare case-insensitively.
fn merge_headers(
    source: &BTreeMap<String, String>,
    runtime: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = source.clone();
    for (name, value) in runtime {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.clone(), value.clone());
    }
    merged
}

fn decode_body(resp: HttpResponseParts) -> Result<FetchedPayload, FetchFailure> {
    let essence = resp
        .header("content-type")
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

    match essence.as_deref() {
        Some(ct) if ct == "application/json" || ct.ends_with("+json") => {
            serde_json::from_slice(&resp.body)
                .map(FetchedPayload::Json)
                .map_err(|e| FetchFailure::Parse(e.to_string()))
        }
        Some(ct) if ct.starts_with("text/") => Ok(FetchedPayload::Text(
            String::from_utf8_lossy(&resp.body).into_owned(),
        )),
        Some(ct) => Ok(FetchedPayload::Binary {
            content_type: ct.to_string(),
            bytes: resp.body,
        }),
        // No declared type: take JSON if it parses, then UTF-8 text.
        None => {
            if let Ok(v) = serde_json::from_slice::<JsonValue>(&resp.body) {
                return Ok(FetchedPayload::Json(v));
            }
            match String::from_utf8(resp.body) {
                Ok(text) => Ok(FetchedPayload::Text(text)),
                Err(e) => Ok(FetchedPayload::Binary {
                    content_type: "application/octet-stream".to_string(),
                    bytes: e.into_bytes(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> RuntimeParameters {
        RuntimeParameters::default()
    }

    #[test]
    fn runtime_headers_win_case_insensitively() {
        let mut source = BTreeMap::new();
        source.insert("Authorization".to_string(), "Bearer old".to_string());
        source.insert("Accept".to_string(), "application/json".to_string());
        let mut rt = BTreeMap::new();
        rt.insert("authorization".to_string(), "Bearer new".to_string());

        let merged = merge_headers(&source, &rt);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("authorization").map(String::as_str), Some("Bearer new"));
        assert!(!merged.contains_key("Authorization"));
    }

    #[test]
    fn params_only_apply_to_get() {
        let api = ApiSource {
            endpoint: Some("https://example.com/items?limit=5".to_string()),
            ..ApiSource::default()
        };
        let mut rt = runtime();
        rt.params.insert("page".to_string(), "2".to_string());

        let get = build_request("https://example.com/items?limit=5", &api, &rt).unwrap();
        assert_eq!(get.method, "GET");
        assert_eq!(get.url.query(), Some("limit=5&page=2"));

        rt.method = Some("post".to_string());
        rt.body = Some(serde_json::json!({"a": 1}));
        let post = build_request("https://example.com/items?limit=5", &api, &rt).unwrap();
        assert_eq!(post.method, "POST");
        assert_eq!(post.url.query(), Some("limit=5"));
        assert_eq!(post.body, br#"{"a":1}"#.to_vec());
        assert_eq!(
            post.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn source_method_used_when_runtime_has_none() {
        let api = ApiSource {
            method: Some("DELETE".to_string()),
            ..ApiSource::default()
        };
        let req = build_request("https://example.com", &api, &runtime()).unwrap();
        assert_eq!(req.method, "DELETE");
        assert!(req.body.is_empty());
    }

    #[test]
    fn content_type_selects_payload_kind() {
        let resp = |ct: Option<&str>, body: &[u8]| HttpResponseParts {
            status: 200,
            headers: ct
                .map(|ct| BTreeMap::from([("content-type".to_string(), ct.to_string())]))
                .unwrap_or_default(),
            body: body.to_vec(),
        };

        assert_eq!(
            decode_body(resp(Some("application/vnd.api+json; charset=utf-8"), b"[1]")).unwrap(),
            FetchedPayload::Json(serde_json::json!([1]))
        );
        assert_eq!(
            decode_body(resp(Some("text/plain"), b"hi")).unwrap(),
            FetchedPayload::Text("hi".to_string())
        );
        assert!(matches!(
            decode_body(resp(Some("image/png"), &[0x89, 0x50])).unwrap(),
            FetchedPayload::Binary { .. }
        ));
        assert!(matches!(
            decode_body(resp(Some("application/json"), b"{oops")),
            Err(FetchFailure::Parse(_))
        ));
        assert_eq!(
            decode_body(resp(None, b"{\"a\":1}")).unwrap(),
            FetchedPayload::Json(serde_json::json!({"a": 1}))
        );
    }
}
