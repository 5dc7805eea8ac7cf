mod api_keys;
mod migrate;
mod query;
mod store;

pub use migrate::run_migrations;
pub use store::PostgresStore;
