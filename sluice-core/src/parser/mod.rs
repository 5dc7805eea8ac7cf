use serde::de::DeserializeOwned;

use crate::error::ParseError;
use crate::types::{EndpointAuthConfig, InvocationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedInvocation {
    pub request: InvocationRequest,
    pub format: DocumentFormat,
}

pub fn parse_invocation_str(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedInvocation, ParseError> {
    let (request, format) = parse_str::<InvocationRequest>(input, format)?;
    Ok(ParsedInvocation { request, format })
}

pub fn parse_auth_config_str(
    input: &str,
    format: DocumentFormat,
) -> Result<EndpointAuthConfig, ParseError> {
    parse_str::<EndpointAuthConfig>(input, format).map(|(config, _)| config)
}

/// Parses `input` as `T`, returning the concrete format that succeeded.
pub fn parse_str<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<(T, DocumentFormat), ParseError> {
    match format {
        DocumentFormat::Json => Ok((serde_json::from_str::<T>(input)?, format)),
        DocumentFormat::Yaml => Ok((serde_yaml::from_str::<T>(input)?, format)),
        DocumentFormat::Auto => parse_auto(input),
    }
}

fn parse_auto<T: DeserializeOwned>(input: &str) -> Result<(T, DocumentFormat), ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::UnknownFormat);
    }

    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(v) => Ok((v, DocumentFormat::Json)),
            // YAML is a superset of JSON, so flow-style YAML can still land here.
            Err(e) => match serde_yaml::from_str::<T>(input) {
                Ok(v) => Ok((v, DocumentFormat::Yaml)),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(v) => Ok((v, DocumentFormat::Yaml)),
        Err(e) => {
            if let Ok(v) = serde_json::from_str::<T>(input) {
                return Ok((v, DocumentFormat::Json));
            }
            Err(ParseError::Yaml(e))
        }
    }
}
