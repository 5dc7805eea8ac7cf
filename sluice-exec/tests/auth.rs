use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sluice_core::parser::parse_auth_config_str;
use sluice_core::types::EndpointAuthConfig;
use sluice_core::DocumentFormat;
use sluice_exec::{AuthFailure, AuthGate, InboundRequest, StaticTokenIdentityProvider};
use sluice_store::{ApiKeyRecord, ApiKeyStore, StoreError};
use uuid::Uuid;

struct MockKeys {
    valid_key: &'static str,
    record: ApiKeyRecord,
    touched: Mutex<Vec<(Uuid, DateTime<Utc>)>>,
}

impl MockKeys {
    fn new(valid_key: &'static str) -> Self {
        Self {
            valid_key,
            record: ApiKeyRecord {
                id: Uuid::new_v4(),
                name: "ci".to_string(),
                is_active: true,
                last_used_at: None,
            },
            touched: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ApiKeyStore for MockKeys {
    async fn find_active_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        Ok((raw_key == self.valid_key).then(|| self.record.clone()))
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.touched.lock().unwrap().push((id, at));
        Ok(())
    }
}

struct FailingKeys;

#[async_trait]
impl ApiKeyStore for FailingKeys {
    async fn find_active_key(&self, _raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        Err(StoreError::Other("connection refused".to_string()))
    }

    async fn touch_last_used(&self, _id: Uuid, _at: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(())
    }
}

fn config(raw: &str) -> EndpointAuthConfig {
    parse_auth_config_str(raw, DocumentFormat::Auto).unwrap()
}

#[tokio::test]
async fn none_policy_allows_everything() {
    let decision = AuthGate::new()
        .validate(&InboundRequest::new(), &EndpointAuthConfig::None)
        .await;
    assert!(decision.valid);
    assert_eq!(decision.http_status(), 200);
}

#[tokio::test]
async fn api_key_accepts_active_key_and_records_use() {
    let keys = Arc::new(MockKeys::new("k-123"));
    let gate = AuthGate::new().with_api_keys(keys.clone());

    let decision = gate
        .validate(
            &InboundRequest::new().with_header("X-API-Key", "k-123"),
            &config(r#"{"type": "api-key"}"#),
        )
        .await;
    assert!(decision.valid, "{}", decision.message);
    assert_eq!(decision.subject.as_deref(), Some("ci"));

    let touched = keys.touched.lock().unwrap();
    assert_eq!(touched.len(), 1);
    assert_eq!(touched[0].0, keys.record.id);
}

#[tokio::test]
async fn api_key_missing_is_401_and_wrong_is_403() {
    let keys = Arc::new(MockKeys::new("k-123"));
    let gate = AuthGate::new().with_api_keys(keys.clone());
    let policy = config("type: api-key\nheaderName: x-token\n");

    let missing = gate
        .validate(&InboundRequest::new().with_header("x-api-key", "k-123"), &policy)
        .await;
    assert!(!missing.valid);
    assert_eq!(missing.failure, Some(AuthFailure::MissingCredentials));
    assert_eq!(missing.http_status(), 401);
    assert!(missing.message.contains("x-token"));

    let wrong = gate
        .validate(&InboundRequest::new().with_header("x-token", "nope"), &policy)
        .await;
    assert_eq!(wrong.http_status(), 403);
    assert!(keys.touched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn api_key_store_failure_is_rejected() {
    let gate = AuthGate::new().with_api_keys(Arc::new(FailingKeys));
    let decision = gate
        .validate(
            &InboundRequest::new().with_header("x-api-key", "k"),
            &config(r#"{"type": "api-key"}"#),
        )
        .await;
    assert_eq!(decision.http_status(), 403);
    assert!(decision.message.contains("connection refused"));
}

#[tokio::test]
async fn api_key_without_store_is_rejected() {
    let decision = AuthGate::new()
        .validate(
            &InboundRequest::new().with_header("x-api-key", "k"),
            &config(r#"{"type": "api-key"}"#),
        )
        .await;
    assert_eq!(decision.http_status(), 403);
}

#[tokio::test]
async fn bearer_tokens_resolve_through_identity_provider() {
    let provider = Arc::new(StaticTokenIdentityProvider::from_list("t1, t2", "svc"));
    let gate = AuthGate::new().with_identity_provider(provider);
    let policy = config(r#"{"type": "bearer"}"#);

    let ok = gate
        .validate(&InboundRequest::new().with_header("Authorization", "bearer t2"), &policy)
        .await;
    assert!(ok.valid);
    assert_eq!(ok.subject.as_deref(), Some("svc"));

    let bad = gate
        .validate(&InboundRequest::new().with_header("Authorization", "Bearer t3"), &policy)
        .await;
    assert_eq!(bad.http_status(), 403);

    let missing = gate
        .validate(&InboundRequest::new().with_header("Authorization", "Bearer "), &policy)
        .await;
    assert_eq!(missing.http_status(), 401);
}

#[tokio::test]
async fn basic_credentials_are_compared() {
    let gate = AuthGate::new();
    let policy = config(r#"{"type": "basic", "username": "admin", "password": "s3cret"}"#);

    // "admin:s3cret"
    let ok = gate
        .validate(
            &InboundRequest::new().with_header("authorization", "Basic YWRtaW46czNjcmV0"),
            &policy,
        )
        .await;
    assert!(ok.valid);

    // "admin:wrong"
    let wrong = gate
        .validate(
            &InboundRequest::new().with_header("authorization", "Basic YWRtaW46d3Jvbmc="),
            &policy,
        )
        .await;
    assert_eq!(wrong.http_status(), 403);

    let malformed = gate
        .validate(&InboundRequest::new().with_header("authorization", "Basic !!!"), &policy)
        .await;
    assert_eq!(malformed.failure, Some(AuthFailure::InvalidCredentials));

    let missing = gate.validate(&InboundRequest::new(), &policy).await;
    assert_eq!(missing.http_status(), 401);
}
