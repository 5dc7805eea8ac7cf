use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a pipeline invocation document and print the result envelope.
    Run {
        path: PathBuf,
        #[command(flatten)]
        runtime: RuntimeArgs,
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        auth: AuthArgs,
        #[command(flatten)]
        store: StoreArgs,
        /// Exit non-zero when any source fails to fetch.
        #[arg(long)]
        fail_on_error: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse and validate an invocation document.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the arrays a data path crosses in sample data.
    Crossings {
        #[arg(value_name = "PATH")]
        data_path: String,
        #[arg(long)]
        sample: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render a data path with explicit array indices.
    Render {
        #[arg(value_name = "PATH")]
        data_path: String,
        #[arg(long, value_name = "PREFIX=INDEX")]
        select: Vec<String>,
        /// Resolve the rendered path against this data file.
        #[arg(long)]
        sample: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Apply saved field mappings to a source document.
    Map {
        #[arg(long)]
        mappings: PathBuf,
        #[arg(long)]
        source: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, default_value_t = 5)]
        max_connections: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
}
