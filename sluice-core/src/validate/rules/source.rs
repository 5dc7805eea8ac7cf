use crate::error::SourceSpecError;
use crate::path::parse_indexed_path;
use crate::types::{SourceDescriptor, SourceSpec};
use crate::validate::validator::Validator;

pub(crate) fn validate_source(v: &mut Validator, descriptor: &SourceDescriptor, path: &str) {
    let spec = match descriptor.spec() {
        Ok(spec) => spec,
        Err(e @ SourceSpecError::UnknownType(_)) => {
            v.push(format!("{path}.type"), e.to_string());
            return;
        }
        Err(e @ SourceSpecError::InvalidConfig { .. }) => {
            v.push(format!("{path}.config"), e.to_string());
            return;
        }
    };

    // Missing endpoint/url/query is reported by the fetcher at run time so
    // sibling sources still run.
    match &spec {
        SourceSpec::Api(api) => {
            v.validate_header_names(&format!("{path}.config.headers"), api.headers.keys());
            if let Some(data_path) = &api.data_path {
                if let Err(e) = parse_indexed_path(data_path) {
                    v.push(format!("{path}.config.dataPath"), e.to_string());
                }
            }
        }
        SourceSpec::Database(_) | SourceSpec::Rss(_) | SourceSpec::File(_) => {}
    }
}
