use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::types::{FeedMetadata, SourceDescriptor, TransformationStep};

/// Body of a single pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InvocationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PipelineDefinition>,

    #[serde(default)]
    pub params: BTreeMap<String, String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

impl InvocationRequest {
    pub fn runtime(&self) -> RuntimeParameters {
        RuntimeParameters {
            params: self.params.clone(),
            headers: self.headers.clone(),
            method: self.method.clone(),
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub data_sources: Vec<SourceDescriptor>,

    #[serde(default)]
    pub transformations: Vec<TransformationStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_config: Option<SchemaConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub metadata: FeedMetadata,
}

/// Per-invocation values merged over source-level defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeParameters {
    pub params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub method: Option<String>,
    pub body: Option<JsonValue>,
}
