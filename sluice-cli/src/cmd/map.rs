use std::path::Path;

use serde_json::Value as JsonValue;
use sluice_core::{apply_field_mappings, FieldMapping};

use crate::cmd::config::load_document;
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::OutputArgs;

pub async fn map_cmd(mappings: &Path, source: &Path, output: OutputArgs) -> i32 {
    let mappings: Vec<FieldMapping> = match load_document(mappings, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let source: JsonValue = match load_document(source, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    match apply_field_mappings(&mappings, &source) {
        Ok(record) => {
            print_result(output.format, output.quiet, &record);
            exit_codes::SUCCESS
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::VALIDATION_FAILED
        }
    }
}
