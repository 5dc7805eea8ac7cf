use std::path::Path;

use serde_json::Value as JsonValue;
use sluice_core::IndexedPath;

use crate::cmd::config::load_document;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::parse_key_values;
use crate::OutputArgs;

#[derive(serde::Serialize)]
struct RenderResult {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<JsonValue>,
}

pub async fn render_cmd(
    data_path: &str,
    select: &[String],
    sample: Option<&Path>,
    output: OutputArgs,
) -> i32 {
    let mut indexed = IndexedPath::new(data_path);
    let selections = match parse_key_values(select, "selection") {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::VALIDATION_FAILED;
        }
    };
    for (prefix, index) in selections {
        match index.trim().parse::<usize>() {
            Ok(index) => indexed = indexed.select(prefix, index),
            Err(_) => {
                print_error(
                    output.format,
                    output.quiet,
                    &format!("invalid index '{index}' for '{prefix}'"),
                );
                return exit_codes::VALIDATION_FAILED;
            }
        }
    }

    let value = match sample {
        None => None,
        Some(sample) => {
            let data: JsonValue = match load_document(sample, &output) {
                Ok(v) => v,
                Err(code) => return code,
            };
            match indexed.resolve(&data) {
                Ok(v) => Some(v.cloned().unwrap_or(JsonValue::Null)),
                Err(e) => {
                    print_error(output.format, output.quiet, &e.to_string());
                    return exit_codes::VALIDATION_FAILED;
                }
            }
        }
    };

    let result = RenderResult {
        path: indexed.render(),
        value,
    };
    if output.format == OutputFormat::Text && !output.quiet {
        println!("{}", result.path);
        if let Some(value) = &result.value {
            println!("{value}");
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
