use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::store::types::ApiKeyRecord;
use crate::store::StoreError;

/// Executes a database source's query. `connection` is the descriptor from
/// the source config, passed through untouched.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    async fn query(&self, connection: &JsonValue, query: &str) -> Result<Vec<JsonValue>, StoreError>;
}

#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Looks up an active key by its raw (unhashed) value.
    async fn find_active_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}
