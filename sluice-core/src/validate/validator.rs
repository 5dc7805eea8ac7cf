use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::InvocationRequest;

use super::rules;

/// RFC 7230 token characters.
pub(crate) static HEADER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").expect("valid"));

pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_invocation(&mut self, request: &InvocationRequest) {
        rules::invocation::validate_invocation(self, request);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn validate_header_names<'a>(
        &mut self,
        path: &str,
        names: impl IntoIterator<Item = &'a String>,
    ) {
        for name in names {
            if !HEADER_NAME_RE.is_match(name) {
                self.push(format!("{path}.{name}"), "is not a valid HTTP header name");
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
