use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{hash_api_key, ApiKeyRecord, StoreError};

pub async fn find_active_key(
    pool: &PgPool,
    raw_key: &str,
) -> Result<Option<ApiKeyRecord>, StoreError> {
    let record = sqlx::query_as::<_, ApiKeyRecord>(
        r#"
SELECT id, name, is_active, last_used_at
FROM api_keys
WHERE key_hash = $1 AND is_active
        "#,
    )
    .bind(hash_api_key(raw_key))
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn touch_last_used(pool: &PgPool, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
    sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE id = $1")
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_key(pool: &PgPool, name: &str, raw_key: &str) -> Result<Uuid, StoreError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
INSERT INTO api_keys (name, key_hash)
VALUES ($1, $2)
RETURNING id
        "#,
    )
    .bind(name)
    .bind(hash_api_key(raw_key))
    .fetch_one(pool)
    .await?;
    Ok(id)
}
