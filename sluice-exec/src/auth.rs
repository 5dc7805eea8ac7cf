//! Per-endpoint authorization checked before a pipeline runs.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use secrecy::ExposeSecret;
use sluice_core::types::EndpointAuthConfig;
use sluice_store::{ApiKeyStore, StoreError};

/// The parts of an inbound call the gate looks at.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub headers: BTreeMap<String, String>,
}

impl InboundRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive lookup; blank values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingCredentials,
    InvalidCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub valid: bool,
    pub message: String,
    pub failure: Option<AuthFailure>,
    /// Who the caller authenticated as, when the policy identifies one.
    pub subject: Option<String>,
}

impl AuthDecision {
    fn allow(message: impl Into<String>, subject: Option<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
            failure: None,
            subject,
        }
    }

    fn missing(message: impl Into<String>) -> Self {
        Self::deny(AuthFailure::MissingCredentials, message)
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self::deny(AuthFailure::InvalidCredentials, message)
    }

    fn deny(failure: AuthFailure, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            failure: Some(failure),
            subject: None,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.failure {
            None => 200,
            Some(AuthFailure::MissingCredentials) => 401,
            Some(AuthFailure::InvalidCredentials) => 403,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("api key lookup failed: {0}")]
    Store(#[from] StoreError),
    #[error("identity provider error: {0}")]
    Identity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the token is unknown or expired.
    async fn validate(&self, token: &str) -> Result<Option<Identity>, AuthError>;
}

/// Accepts a fixed set of bearer tokens.
pub struct StaticTokenIdentityProvider {
    tokens: HashSet<String>,
    subject: String,
}

impl StaticTokenIdentityProvider {
    pub fn new(tokens: impl IntoIterator<Item = String>, subject: impl Into<String>) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.trim().is_empty()).collect(),
            subject: subject.into(),
        }
    }

    /// Parses a comma-separated token list.
    pub fn from_list(list: &str, subject: impl Into<String>) -> Self {
        Self::new(list.split(',').map(|t| t.trim().to_string()), subject)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    async fn validate(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self.tokens.contains(token).then(|| Identity {
            subject: self.subject.clone(),
        }))
    }
}

#[derive(Default)]
pub struct AuthGate {
    api_keys: Option<Arc<dyn ApiKeyStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_keys(mut self, store: Arc<dyn ApiKeyStore>) -> Self {
        self.api_keys = Some(store);
        self
    }

    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    pub async fn validate(
        &self,
        request: &InboundRequest,
        config: &EndpointAuthConfig,
    ) -> AuthDecision {
        let decision = match config {
            EndpointAuthConfig::None => AuthDecision::allow("no authentication required", None),
            EndpointAuthConfig::ApiKey { header_name } => {
                let header = header_name
                    .as_deref()
                    .filter(|h| !h.trim().is_empty())
                    .unwrap_or(EndpointAuthConfig::DEFAULT_API_KEY_HEADER);
                self.check_api_key(request, header).await
            }
            EndpointAuthConfig::Bearer => self.check_bearer(request).await,
            EndpointAuthConfig::Basic { username, password } => {
                check_basic(request, username, password.expose_secret())
            }
        };

        if decision.valid {
            tracing::debug!(policy = config.auth_type(), subject = ?decision.subject, "request authorized");
        } else {
            tracing::info!(policy = config.auth_type(), reason = %decision.message, "request denied");
        }
        decision
    }

    async fn check_api_key(&self, request: &InboundRequest, header: &str) -> AuthDecision {
        let Some(raw_key) = request.header(header) else {
            return AuthDecision::missing(format!("missing API key in header '{header}'"));
        };
        let Some(store) = &self.api_keys else {
            return AuthDecision::rejected("API key authentication is not configured");
        };

        match store.find_active_key(raw_key).await {
            Ok(Some(record)) => {
                if let Err(e) = store.touch_last_used(record.id, chrono::Utc::now()).await {
                    tracing::warn!(key_id = %record.id, error = %e, "failed to record api key use");
                }
                AuthDecision::allow("valid API key", Some(record.name))
            }
            Ok(None) => AuthDecision::rejected("invalid or inactive API key"),
            Err(e) => {
                tracing::warn!(error = %e, "api key lookup failed");
                AuthDecision::rejected(AuthError::from(e).to_string())
            }
        }
    }

    async fn check_bearer(&self, request: &InboundRequest) -> AuthDecision {
        let Some(token) = request
            .header("authorization")
            .and_then(|h| strip_scheme(h, "Bearer"))
        else {
            return AuthDecision::missing("missing bearer token");
        };
        let Some(provider) = &self.identity else {
            return AuthDecision::rejected("bearer authentication is not configured");
        };

        match provider.validate(token).await {
            Ok(Some(identity)) => AuthDecision::allow("valid bearer token", Some(identity.subject)),
            Ok(None) => AuthDecision::rejected("invalid or expired token"),
            Err(e) => {
                tracing::warn!(error = %e, "identity provider failed");
                AuthDecision::rejected(e.to_string())
            }
        }
    }
}

fn check_basic(request: &InboundRequest, username: &str, password: &str) -> AuthDecision {
    let Some(encoded) = request
        .header("authorization")
        .and_then(|h| strip_scheme(h, "Basic"))
    else {
        return AuthDecision::missing("missing basic credentials");
    };

    let decoded = match base64::engine::general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => String::from_utf8(bytes).ok(),
        Err(_) => None,
    };
    let Some((user, pass)) = decoded.as_deref().and_then(|d| d.split_once(':')) else {
        return AuthDecision::rejected("malformed basic credentials");
    };

    if user == username && pass == password {
        AuthDecision::allow("valid basic credentials", Some(user.to_string()))
    } else {
        AuthDecision::rejected("invalid username or password")
    }
}

/// `"<Scheme> <value>"` with a case-insensitive scheme; blank values are absent.
fn strip_scheme<'a>(header: &'a str, scheme: &str) -> Option<&'a str> {
    let (given, rest) = header.split_once(' ')?;
    if !given.eq_ignore_ascii_case(scheme) {
        return None;
    }
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}
