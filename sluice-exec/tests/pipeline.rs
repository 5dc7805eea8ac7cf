use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use sluice_core::types::{EndpointAuthConfig, InvocationRequest};
use sluice_exec::{
    AuthGate, FetchSettings, Fetcher, HttpClient, HttpError, HttpRequestParts, HttpResponseParts,
    InboundRequest, PipelineRunner, StaticTokenIdentityProvider,
};

/// Serves JSON bodies by URL path; `/slow` never answers in time and
/// `/down` fails at the transport.
struct RoutedHttpClient {
    routes: BTreeMap<String, JsonValue>,
}

impl RoutedHttpClient {
    fn new(routes: &[(&str, JsonValue)]) -> Self {
        Self {
            routes: routes
                .iter()
                .map(|(path, body)| (path.to_string(), body.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl HttpClient for RoutedHttpClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        match req.url.path() {
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(HttpError::Timeout)
            }
            "/down" => Err(HttpError::Network("connection refused".to_string())),
            path => match self.routes.get(path) {
                Some(body) => Ok(HttpResponseParts {
                    status: 200,
                    headers: BTreeMap::from([(
                        "content-type".to_string(),
                        "application/json".to_string(),
                    )]),
                    body: body.to_string().into_bytes(),
                }),
                None => Ok(HttpResponseParts {
                    status: 404,
                    headers: BTreeMap::new(),
                    body: b"not found".to_vec(),
                }),
            },
        }
    }
}

fn runner(routes: &[(&str, JsonValue)]) -> PipelineRunner {
    runner_with(routes, FetchSettings::default())
}

fn runner_with(routes: &[(&str, JsonValue)], settings: FetchSettings) -> PipelineRunner {
    let http = Arc::new(RoutedHttpClient::new(routes));
    PipelineRunner::new(Fetcher::new(http, settings))
}

fn request(raw: JsonValue) -> InvocationRequest {
    serde_json::from_value(raw).unwrap()
}

fn api_source(id: &str, path: &str) -> JsonValue {
    json!({"id": id, "name": id, "type": "api", "config": {"endpoint": format!("https://api.test{path}")}})
}

#[tokio::test]
async fn single_source_with_data_path_and_filter() {
    let runner = runner(&[("/data", json!({"a": {"b": [{"x": 1}, {"x": 2}]}}))]);
    let result = runner
        .run(&request(json!({"config": {
            "data_sources": [{"name": "d", "type": "api", "config": {"endpoint": "https://api.test/data", "dataPath": "a.b"}}],
            "transformations": [{"type": "filter", "field": "x", "operator": "greater_than", "value": 1}]
        }})))
        .await;

    assert!(result.success);
    assert_eq!(result.status, 200);
    assert_eq!(result.response, Some(json!([{"x": 2}])));
    let headers = result.headers.clone().unwrap();
    assert_eq!(headers["Content-Type"], "application/json");
    assert!(headers["X-Response-Time"].ends_with("ms"));

    let envelope = result.to_json();
    assert_eq!(envelope["success"], json!(true));
    assert!(envelope.get("responseTime").is_some());
    assert!(envelope.get("error").is_none());
}

#[tokio::test]
async fn aggregate_and_csv_output() {
    let runner = runner(&[("/rows", json!([{"x": 1}, {"x": 2}]))]);
    let sum = runner
        .run(&request(json!({"config": {
            "data_sources": [api_source("rows", "/rows")],
            "transformations": [{"type": "aggregate", "function": "sum", "field": "x"}]
        }})))
        .await;
    assert_eq!(sum.response, Some(json!({"sum": 3})));

    let csv = runner
        .run(&request(json!({"config": {
            "data_sources": [api_source("rows", "/rows")],
            "output_format": "csv"
        }})))
        .await;
    assert_eq!(csv.response, Some(json!("x\n1\n2\n")));
    assert_eq!(csv.headers.unwrap()["Content-Type"], "text/csv");
}

#[tokio::test]
async fn failing_source_is_contained() {
    let runner = runner(&[("/ok", json!({"fine": true}))]);
    let result = runner
        .run(&request(json!({"config": {
            "data_sources": [api_source("good", "/ok"), api_source("bad", "/down")]
        }})))
        .await;

    assert!(result.success);
    let response = result.response.clone().unwrap();
    assert_eq!(response["good"], json!({"fine": true}));
    assert_eq!(response["bad"]["source"], json!("bad"));
    assert!(response["bad"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.failed_sources, vec!["bad".to_string()]);
    assert!(result.to_json().get("failedSources").is_none());
}

#[tokio::test]
async fn single_failing_source_passes_error_slot_unwrapped() {
    let runner = runner(&[]);
    let result = runner
        .run(&request(json!({"config": {"data_sources": [api_source("only", "/missing")]}})))
        .await;
    assert!(result.success);
    let response = result.response.unwrap();
    assert_eq!(response["source"], json!("only"));
    assert!(response["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn slow_source_times_out_without_failing_pipeline() {
    let settings = FetchSettings {
        timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let runner = runner_with(&[("/fast", json!([1]))], settings);
    let result = runner
        .run(&request(json!({"config": {
            "data_sources": [api_source("fast", "/fast"), api_source("slow", "/slow")]
        }})))
        .await;

    assert!(result.success);
    let response = result.response.unwrap();
    assert_eq!(response["fast"], json!([1]));
    assert_eq!(response["slow"]["error"], json!("timeout"));
}

#[tokio::test]
async fn invalid_configuration_is_reported_in_envelope() {
    let result = runner(&[])
        .run(&request(json!({"config": {"data_sources": [{"name": "x", "type": "smtp"}]}})))
        .await;

    assert!(!result.success);
    assert_eq!(result.status, 500);
    assert!(result.error.as_deref().unwrap().contains("smtp"));
    assert!(result.response.is_none());

    let envelope = result.to_json();
    assert_eq!(envelope, json!({"success": false, "error": result.error, "status": 500}));
}

#[tokio::test]
async fn unsupported_output_format_falls_back_with_note() {
    let result = runner(&[("/d", json!({"a": 1}))])
        .run(&request(json!({"config": {
            "data_sources": [api_source("d", "/d")],
            "output_format": "parquet"
        }})))
        .await;
    assert!(result.success);
    assert_eq!(result.response, Some(json!({"a": 1})));
    assert!(result.diagnostics.iter().any(|n| n.contains("parquet")));
}

#[tokio::test]
async fn run_until_stops_on_cancellation() {
    let runner = runner(&[]);
    let req = request(json!({"config": {"data_sources": [api_source("slow", "/slow")]}}));

    let outcome = runner
        .run_until(&req, tokio::time::sleep(Duration::from_millis(20)))
        .await;
    assert!(outcome.is_none());

    let finished = runner
        .run_until(
            &request(json!({"config": {"data_sources": [api_source("down", "/down")]}})),
            std::future::pending::<()>(),
        )
        .await;
    assert!(finished.is_some());
}

#[tokio::test]
async fn handle_checks_authorization_first() {
    let runner = runner(&[("/d", json!([1]))]).with_auth_gate(
        AuthGate::new().with_identity_provider(Arc::new(StaticTokenIdentityProvider::from_list(
            "secret-token",
            "tester",
        ))),
    );
    let req = request(json!({"config": {"data_sources": [api_source("d", "/d")]}}));

    let denied = runner
        .handle(&InboundRequest::new(), &EndpointAuthConfig::Bearer, &req)
        .await;
    assert!(!denied.success);
    assert_eq!(denied.status, 401);

    let rejected = runner
        .handle(
            &InboundRequest::new().with_header("Authorization", "Bearer wrong"),
            &EndpointAuthConfig::Bearer,
            &req,
        )
        .await;
    assert_eq!(rejected.status, 403);

    let allowed = runner
        .handle(
            &InboundRequest::new().with_header("Authorization", "Bearer secret-token"),
            &EndpointAuthConfig::Bearer,
            &req,
        )
        .await;
    assert!(allowed.success);
    assert_eq!(allowed.response, Some(json!([1])));
}
