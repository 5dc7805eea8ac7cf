use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Applied per source, both by the HTTP client and around the whole fetch.
    pub timeout: Duration,
    pub max_response_bytes: usize,
    /// How much of a failed response body is kept for diagnostics.
    pub diagnostic_body_bytes: usize,
    /// Lets `file` and `rss` sources read `file://` URLs from the local host.
    /// Off unless the configuration comes from a trusted operator.
    pub allow_file_urls: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            diagnostic_body_bytes: 500,
            allow_file_urls: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            user_agent: concat!("sluice/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
