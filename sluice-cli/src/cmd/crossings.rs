use std::path::Path;

use serde_json::Value as JsonValue;
use sluice_core::{analyze_array_crossings, IndexedPath};

use crate::cmd::config::load_document;
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CrossingsResult {
    path: String,
    crossings: Vec<sluice_core::ArrayCrossing>,
    /// The path with index 0 chosen at every crossing.
    default_path: String,
}

pub async fn crossings_cmd(data_path: &str, sample: &Path, output: OutputArgs) -> i32 {
    let sample: JsonValue = match load_document(sample, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let crossings = analyze_array_crossings(data_path, &sample);
    let default_path = IndexedPath::from_crossings(data_path, &crossings).render();

    if output.format == OutputFormat::Text && !output.quiet {
        if crossings.is_empty() {
            println!("no arrays crossed along '{data_path}'");
        }
        for c in &crossings {
            println!(
                "level {}: {} ({} items) at {}",
                c.level, c.field_name, c.array_length, c.full_path
            );
        }
    } else {
        print_result(
            output.format,
            output.quiet,
            &CrossingsResult {
                path: data_path.to_string(),
                crossings,
                default_path,
            },
        );
    }
    exit_codes::SUCCESS
}
