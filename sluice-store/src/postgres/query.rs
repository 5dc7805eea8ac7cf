use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::store::StoreError;

/// Runs `query` inside a read-only transaction and returns its rows as JSON
/// objects keyed by column name.
pub async fn rows_as_json(pool: &PgPool, query: &str) -> Result<Vec<JsonValue>, StoreError> {
    let query = query.trim().trim_end_matches(';');
    if query.is_empty() {
        return Err(StoreError::EmptyQuery);
    }

    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION READ ONLY")
        .execute(&mut *tx)
        .await?;

    let wrapped = format!("SELECT COALESCE(json_agg(t), '[]'::json) FROM ({query}) AS t");
    let rows: JsonValue = sqlx::query_scalar(&wrapped).fetch_one(&mut *tx).await?;
    tx.rollback().await?;

    match rows {
        JsonValue::Array(rows) => Ok(rows),
        other => Err(StoreError::Other(format!(
            "expected a JSON array of rows, got {other}"
        ))),
    }
}
