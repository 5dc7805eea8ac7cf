//! Fetch, transform and format for one invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde_json::{json, Map, Value as JsonValue};
use sluice_core::types::{
    EndpointAuthConfig, InvocationRequest, OutputFormat, ResolvedPipeline, ResolvedSource,
    RuntimeParameters,
};
use sluice_core::resolve_invocation;
use tracing::Instrument;

use crate::auth::{AuthGate, InboundRequest};
use crate::fetch::{FetchFailure, Fetcher, SourceFetchError};
use crate::format;
use crate::http::HttpError;
use crate::transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingSources,
    Transforming,
    Formatting,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingSources => "fetching_sources",
            Self::Transforming => "transforming",
            Self::Formatting => "formatting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The invocation envelope. Logical failures still travel with transport
/// status 200; `status` here carries the logical outcome.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    /// Keys of sources whose fetch failed. Not part of the envelope.
    #[serde(skip)]
    pub failed_sources: Vec<String>,
}

impl PipelineResult {
    pub fn failure(error: impl Into<String>, status: u16) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
            status,
            headers: None,
            response_time: None,
            diagnostics: Vec::new(),
            failed_sources: Vec::new(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|e| {
            json!({ "success": false, "error": e.to_string(), "status": 500 })
        })
    }
}

pub struct PipelineRunner {
    fetcher: Fetcher,
    auth: AuthGate,
}

impl PipelineRunner {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            auth: AuthGate::new(),
        }
    }

    pub fn with_auth_gate(mut self, auth: AuthGate) -> Self {
        self.auth = auth;
        self
    }

    /// Authorizes `inbound` against `auth_config`, then runs the pipeline.
    pub async fn handle(
        &self,
        inbound: &InboundRequest,
        auth_config: &EndpointAuthConfig,
        request: &InvocationRequest,
    ) -> PipelineResult {
        let decision = self.auth.validate(inbound, auth_config).await;
        if !decision.valid {
            return PipelineResult::failure(decision.message.clone(), decision.http_status());
        }
        self.run(request).await
    }

    /// Runs until done, or returns `None` as soon as `cancel` completes.
    /// Outstanding fetches are dropped on cancellation.
    pub async fn run_until<F>(&self, request: &InvocationRequest, cancel: F) -> Option<PipelineResult>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run(request) => Some(result),
            () = cancel => {
                tracing::info!("pipeline cancelled");
                None
            }
        }
    }

    pub async fn run(&self, request: &InvocationRequest) -> PipelineResult {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &InvocationRequest) -> PipelineResult {
        let started = Instant::now();
        let mut state = PipelineState::Idle;

        let pipeline = match resolve_invocation(request) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                transition(&mut state, PipelineState::Failed);
                tracing::warn!(error = %e.summary(), "invalid pipeline configuration");
                return PipelineResult::failure(format!("{e}: {}", e.summary()), 500);
            }
        };

        let result = self.execute(&pipeline, &mut state).await;
        tracing::info!(
            state = %state,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        result
    }

    /// Runs an already-validated pipeline.
    pub async fn run_resolved(&self, pipeline: &ResolvedPipeline) -> PipelineResult {
        let mut state = PipelineState::Idle;
        self.execute(pipeline, &mut state).await
    }

    async fn execute(&self, pipeline: &ResolvedPipeline, state: &mut PipelineState) -> PipelineResult {
        let started = Instant::now();
        let mut diagnostics = pipeline.notes.clone();
        let mut failed_sources = Vec::new();

        transition(state, PipelineState::FetchingSources);
        let data = self
            .fetch_all(&pipeline.sources, &pipeline.runtime, &mut diagnostics, &mut failed_sources)
            .await;

        transition(state, PipelineState::Transforming);
        let transformed = transform::apply(&pipeline.transformations, data);
        diagnostics.extend(transformed.notes);

        transition(state, PipelineState::Formatting);
        let formatted = format::format(&pipeline.output, &transformed.data);
        let response = match pipeline.output.format {
            OutputFormat::Json => transformed.data,
            _ => JsonValue::String(formatted.body),
        };

        transition(state, PipelineState::Done);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), formatted.content_type.to_string()),
            ("X-Response-Time".to_string(), format!("{elapsed_ms}ms")),
        ]);

        PipelineResult {
            success: true,
            response: Some(response),
            error: None,
            status: 200,
            headers: Some(headers),
            response_time: Some(elapsed_ms),
            diagnostics,
            failed_sources,
        }
    }

    /// Fetches every source concurrently. A single source's value is returned
    /// as-is; several sources are merged into an object keyed by source key.
    async fn fetch_all(
        &self,
        sources: &[ResolvedSource],
        runtime: &RuntimeParameters,
        diagnostics: &mut Vec<String>,
        failed_sources: &mut Vec<String>,
    ) -> JsonValue {
        let timeout = self.fetcher.settings().timeout;
        let fetches = sources.iter().map(|source| async move {
            let started = Instant::now();
            let result = fetch_with_timeout(&self.fetcher, source, runtime, timeout).await;
            tracing::debug!(
                source = %source.key,
                ok = result.is_ok(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "source settled"
            );
            (source, result)
        });
        let settled = join_all(fetches).await;

        let mut bag = Map::with_capacity(settled.len());
        for (source, result) in settled {
            let value = match result {
                Ok(payload) => payload.into_json(),
                Err(e) => {
                    tracing::warn!(source = %source.key, error = %e, "source fetch failed");
                    diagnostics.push(e.to_string());
                    failed_sources.push(source.key.clone());
                    json!({ "error": e.cause.to_string(), "source": source.name })
                }
            };
            bag.insert(source.key.clone(), value);
        }

        if sources.len() == 1 {
            if let Some((_, only)) = bag.into_iter().next() {
                return only;
            }
            return JsonValue::Null;
        }
        JsonValue::Object(bag)
    }
}

async fn fetch_with_timeout(
    fetcher: &Fetcher,
    source: &ResolvedSource,
    runtime: &RuntimeParameters,
    timeout: Duration,
) -> Result<crate::fetch::FetchedPayload, SourceFetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch(source, runtime)).await {
        Ok(result) => result,
        Err(_) => Err(SourceFetchError {
            source_name: source.name.clone(),
            cause: FetchFailure::Http(HttpError::Timeout),
        }),
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!(from = %state, to = %next, "pipeline state");
    *state = next;
}
