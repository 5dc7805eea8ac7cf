#![forbid(unsafe_code)]

//! Runtime engine for Sluice pipelines: fetch, transform, format.
//!
//! Configuration parsing and validation live in `sluice-core`; database and
//! API-key collaborators are defined in `sluice-store`.

pub mod auth;
pub mod config;
pub mod fetch;
pub mod format;
pub mod http;
pub mod pipeline;
pub mod transform;

pub use crate::auth::{
    AuthDecision, AuthError, AuthFailure, AuthGate, Identity, IdentityProvider, InboundRequest,
    StaticTokenIdentityProvider,
};
pub use crate::config::{EngineConfig, FetchSettings};
pub use crate::fetch::{parse_csv, FetchFailure, FetchedPayload, Fetcher, SourceFetchError};
pub use crate::format::{format, format_at, generate_csv, FormattedResponse};
pub use crate::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use crate::pipeline::{PipelineResult, PipelineRunner, PipelineState};
pub use crate::transform::{apply, TransformError, Transformed};
