#![forbid(unsafe_code)]

pub mod error;
pub mod mapping;
pub mod parser;
pub mod path;
pub mod text;
pub mod types;
pub mod validate;

pub use crate::error::{ConfigError, ParseError, PathError, ValidationError, Violation};
pub use crate::mapping::{apply_field_mappings, FieldMapping};
pub use crate::parser::{parse_invocation_str, DocumentFormat, ParsedInvocation};
pub use crate::path::{
    analyze_array_crossings, navigate, navigate_indexed, render_indexed_path, ArrayCrossing,
    IndexedPath,
};
pub use crate::text::TextNormalizer;
pub use crate::types::{InvocationRequest, ResolvedPipeline};
pub use crate::validate::{resolve_invocation, validate_invocation, Validate};

/// Parses and validates an invocation document in one step.
pub fn load_invocation_str(
    input: &str,
    format: DocumentFormat,
) -> Result<ResolvedPipeline, ConfigError> {
    let parsed = parse_invocation_str(input, format)?;
    Ok(resolve_invocation(&parsed.request)?)
}
