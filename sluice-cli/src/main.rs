use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "sluice", version, about = "Declarative data-source pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            path,
            runtime,
            fetch,
            auth,
            store,
            fail_on_error,
            output,
        } => cmd::run::run_cmd(&path, runtime, fetch, auth, store, fail_on_error, output).await,
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output).await,
        Command::Crossings {
            data_path,
            sample,
            output,
        } => cmd::crossings::crossings_cmd(&data_path, &sample, output).await,
        Command::Render {
            data_path,
            select,
            sample,
            output,
        } => cmd::render::render_cmd(&data_path, &select, sample.as_deref(), output).await,
        Command::Map {
            mappings,
            source,
            output,
        } => cmd::map::map_cmd(&mappings, &source, output).await,
        Command::Migrate {
            store,
            max_connections,
            output,
        } => cmd::migrate::migrate_cmd(store, max_connections, output).await,
    }
}
