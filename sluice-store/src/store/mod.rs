mod trait_store;
mod types;

pub use trait_store::{ApiKeyStore, DatabaseClient};
pub use types::{hash_api_key, ApiKeyRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("store error: {0}")]
    Other(String),
}
