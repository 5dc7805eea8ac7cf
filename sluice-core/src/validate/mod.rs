mod rules;
mod validator;

use crate::error::{ValidationError, Violation};
use crate::types::{
    InvocationRequest, OutputSpec, ResolvedPipeline, ResolvedSource, SchemaConfig,
};
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for InvocationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_invocation(self)
    }
}

pub fn validate_invocation(request: &InvocationRequest) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_invocation(request);
    v.finish()
}

/// Validates `request` and resolves every source into its typed form.
pub fn resolve_invocation(request: &InvocationRequest) -> Result<ResolvedPipeline, ValidationError> {
    validate_invocation(request)?;

    // Validation guarantees a config with resolvable sources.
    let Some(config) = request.config.as_ref() else {
        return Err(ValidationError::new(vec![Violation::new("$.config", "is required")]));
    };

    let mut sources = Vec::with_capacity(config.data_sources.len());
    let mut violations = Vec::new();
    for (idx, descriptor) in config.data_sources.iter().enumerate() {
        match descriptor.spec() {
            Ok(spec) => sources.push(ResolvedSource {
                key: descriptor.key().to_string(),
                name: descriptor.display_name().to_string(),
                spec,
            }),
            Err(e) => violations.push(Violation::new(
                format!("$.config.data_sources[{idx}].config"),
                e.to_string(),
            )),
        }
    }
    if !violations.is_empty() {
        return Err(ValidationError::new(violations));
    }

    let metadata = config
        .schema_config
        .as_ref()
        .map(|SchemaConfig { metadata }| metadata.clone())
        .unwrap_or_default();
    let (output, fallback_note) = OutputSpec::resolve(config.output_format.as_deref(), metadata);

    Ok(ResolvedPipeline {
        sources,
        transformations: config.transformations.clone(),
        output,
        runtime: request.runtime(),
        notes: fallback_note.into_iter().collect(),
    })
}
