use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    #[arg(long)]
    pub store: Option<String>,
}

/// Per-invocation values layered over the document's own params/headers/method.
#[derive(Debug, Args, Clone)]
pub struct RuntimeArgs {
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
    #[arg(long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,
    #[arg(long)]
    pub method: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Per-source timeout in milliseconds.
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Let file and rss sources read `file://` URLs.
    #[arg(long)]
    pub allow_file_urls: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AuthArgs {
    /// Endpoint auth policy document (JSON or YAML).
    #[arg(long = "auth", value_name = "FILE")]
    pub auth_config: Option<PathBuf>,
    /// Inbound request header presented to the auth policy.
    #[arg(long = "credential", value_name = "NAME=VALUE")]
    pub credentials: Vec<String>,
}
