use crate::types::{OutputSpec, RuntimeParameters, SourceSpec, TransformationStep};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    /// Slot in the merged result bag.
    pub key: String,
    pub name: String,
    pub spec: SourceSpec,
}

/// A validated invocation with every tagged union resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPipeline {
    pub sources: Vec<ResolvedSource>,
    pub transformations: Vec<TransformationStep>,
    pub output: OutputSpec,
    pub runtime: RuntimeParameters,
    /// Non-fatal notes produced while resolving (e.g. output format fallback).
    pub notes: Vec<String>,
}
