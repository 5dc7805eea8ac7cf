use std::collections::HashSet;

use crate::types::InvocationRequest;
use crate::validate::rules::{source, transform};
use crate::validate::validator::Validator;

pub(crate) fn validate_invocation(v: &mut Validator, request: &InvocationRequest) {
    v.validate_header_names("$.headers", request.headers.keys());

    let Some(config) = &request.config else {
        v.push("$.config", "is required");
        return;
    };

    if config.data_sources.is_empty() {
        v.push("$.config.data_sources", "must have at least one entry");
    }

    let mut keys = HashSet::<&str>::new();
    for (idx, descriptor) in config.data_sources.iter().enumerate() {
        let path = format!("$.config.data_sources[{idx}]");

        let key = descriptor.key();
        if key.trim().is_empty() {
            v.push(format!("{path}.name"), "must not be empty when id is absent");
        } else if !keys.insert(key) {
            v.push(format!("{path}.id"), format!("duplicate source key '{key}'"));
        }

        source::validate_source(v, descriptor, &path);
    }

    for (idx, step) in config.transformations.iter().enumerate() {
        transform::validate_step(v, step, &format!("$.config.transformations[{idx}]"));
    }
}
