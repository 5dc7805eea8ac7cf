use crate::types::TransformationStep;
use crate::validate::validator::Validator;

pub(crate) fn validate_step(v: &mut Validator, step: &TransformationStep, path: &str) {
    match step {
        TransformationStep::Filter(filter) => {
            if filter.field.trim().is_empty() {
                v.push(format!("{path}.field"), "must not be empty");
            }
        }
        TransformationStep::Map(map) => {
            if map.fields.is_empty() {
                v.push(format!("{path}.fields"), "must have at least one entry");
            }
            for (new_key, old_key) in &map.fields {
                if !old_key.is_string() {
                    v.push(
                        format!("{path}.fields.{new_key}"),
                        "must name a source field as a string",
                    );
                }
            }
        }
        // Unknown aggregate functions and step types are tolerated and noted at run time.
        TransformationStep::Aggregate(_) | TransformationStep::Unsupported => {}
    }
}
