use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use sluice_core::parser::parse_str;
use sluice_core::DocumentFormat;
use sluice_exec::{EngineConfig, FetchSettings};

use crate::exit_codes;
use crate::output::print_error;
use crate::{FetchArgs, OutputArgs};

/// Reads a file, reporting failures the way every command does.
pub fn read_input(path: &Path, output: &OutputArgs) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })
}

/// Reads and parses a JSON or YAML file into `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path, output: &OutputArgs) -> Result<T, i32> {
    let content = read_input(path, output)?;
    parse_str::<T>(&content, DocumentFormat::Auto)
        .map(|(value, _)| value)
        .map_err(|e| {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to parse {}: {e}", path.display()),
            );
            exit_codes::VALIDATION_FAILED
        })
}

pub fn database_url(store_arg: Option<String>) -> Option<String> {
    store_arg
        .or_else(|| std::env::var("SLUICE_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
}

pub fn get_database_url(store_arg: Option<String>, output: &OutputArgs) -> Option<String> {
    let url = database_url(store_arg);
    if url.is_none() {
        print_error(
            output.format,
            output.quiet,
            "missing database URL. Set --store <url>, SLUICE_DATABASE_URL, or DATABASE_URL environment variable",
        );
    }
    url
}

pub fn build_engine_config(fetch: &FetchArgs) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        fetch: FetchSettings {
            timeout: Duration::from_millis(fetch.timeout),
            max_response_bytes: fetch.max_response_bytes,
            allow_file_urls: fetch.allow_file_urls,
            ..FetchSettings::default()
        },
        user_agent: fetch.user_agent.clone().unwrap_or(defaults.user_agent),
    }
}
