use std::path::Path;

use serde::Serialize;
use sluice_core::{parse_invocation_str, DocumentFormat, ParseError, Validate};

use crate::cmd::config::read_input;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let content = match read_input(path, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let parsed = match parse_invocation_str(&content, DocumentFormat::Auto) {
        Ok(p) => p,
        Err(ParseError::Json(e)) => {
            print_error(output.format, output.quiet, &format!("JSON parse failed: {e}"));
            return exit_codes::VALIDATION_FAILED;
        }
        Err(ParseError::Yaml(e)) => {
            print_error(output.format, output.quiet, &format!("YAML parse failed: {e}"));
            return exit_codes::VALIDATION_FAILED;
        }
        Err(ParseError::UnknownFormat) => {
            print_error(
                output.format,
                output.quiet,
                "input is neither valid JSON nor valid YAML",
            );
            return exit_codes::VALIDATION_FAILED;
        }
    };

    match parsed.request.validate() {
        Ok(()) => {
            if output.format == OutputFormat::Text && !output.quiet {
                println!("ok: valid pipeline invocation ({:?})", parsed.format);
            } else {
                print_result(
                    output.format,
                    output.quiet,
                    &ValidateResult {
                        valid: true,
                        format: format!("{:?}", parsed.format),
                        errors: vec![],
                    },
                );
            }
            exit_codes::SUCCESS
        }
        Err(err) => {
            let errors: Vec<String> = err
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.path, v.message))
                .collect();
            if output.format == OutputFormat::Text && !output.quiet {
                eprintln!("error: validation failed");
                for e in &errors {
                    eprintln!("- {e}");
                }
            } else {
                print_result(
                    output.format,
                    output.quiet,
                    &ValidateResult {
                        valid: false,
                        format: format!("{:?}", parsed.format),
                        errors,
                    },
                );
            }
            exit_codes::VALIDATION_FAILED
        }
    }
}
