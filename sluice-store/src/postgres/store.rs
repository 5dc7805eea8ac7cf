use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{ApiKeyRecord, ApiKeyStore, DatabaseClient, StoreError};

use super::api_keys;
use super::query;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Builds the pool without opening a connection; the first query connects.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Registers a new key and returns its id. Only the hash is stored.
    pub async fn create_api_key(&self, name: &str, raw_key: &str) -> Result<Uuid, StoreError> {
        api_keys::insert_key(&self.pool, name, raw_key).await
    }
}

#[async_trait::async_trait]
impl DatabaseClient for PostgresStore {
    async fn query(
        &self,
        connection: &JsonValue,
        query: &str,
    ) -> Result<Vec<JsonValue>, StoreError> {
        // Queries always run against this store's pool.
        if !connection.is_null() {
            tracing::debug!(%connection, "ignoring source connection descriptor");
        }
        query::rows_as_json(&self.pool, query).await
    }
}

#[async_trait::async_trait]
impl ApiKeyStore for PostgresStore {
    async fn find_active_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        api_keys::find_active_key(&self.pool, raw_key).await
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        api_keys::touch_last_used(&self.pool, id, at).await
    }
}
