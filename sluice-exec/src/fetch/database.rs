use serde_json::Value as JsonValue;
use sluice_core::types::DatabaseSource;

use super::{require, FetchFailure, FetchedPayload, Fetcher};

pub(super) async fn fetch(
    fetcher: &Fetcher,
    source: &DatabaseSource,
) -> Result<FetchedPayload, FetchFailure> {
    let query = require(source.query.as_deref(), "query")?;
    let client = fetcher
        .database
        .as_ref()
        .ok_or(FetchFailure::NoDatabaseClient)?;

    let rows = client.query(&source.connection, query).await?;
    tracing::debug!(rows = rows.len(), "database query finished");
    Ok(FetchedPayload::Json(JsonValue::Array(rows)))
}
