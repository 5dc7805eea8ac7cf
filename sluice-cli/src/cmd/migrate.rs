use serde::Serialize;
use sluice_store::{run_migrations, PostgresStore};

use crate::cmd::config::get_database_url;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct MigrateResult {
    success: bool,
    message: String,
}

pub async fn migrate_cmd(store: StoreArgs, max_connections: u32, output: OutputArgs) -> i32 {
    let Some(database_url) = get_database_url(store.store, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };

    let pg = match PostgresStore::connect(&database_url, max_connections).await {
        Ok(s) => s,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!(
                    "failed to connect to {}: {e}",
                    redact_url_password(&database_url)
                ),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    match run_migrations(pg.pool()).await {
        Ok(()) => {
            if output.format == OutputFormat::Text && !output.quiet {
                println!("ok: migrations applied");
            } else {
                print_result(
                    output.format,
                    output.quiet,
                    &MigrateResult {
                        success: true,
                        message: "migrations applied".to_string(),
                    },
                );
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            print_error(output.format, output.quiet, &format!("migration failed: {e}"));
            exit_codes::RUNTIME_ERROR
        }
    }
}
