mod auth;
mod invocation;
mod output;
mod resolved;
mod source;
mod transform;

pub use auth::EndpointAuthConfig;
pub use invocation::{InvocationRequest, PipelineDefinition, RuntimeParameters, SchemaConfig};
pub use output::{FeedMetadata, OutputFormat, OutputSpec};
pub use resolved::{ResolvedPipeline, ResolvedSource};
pub use source::{
    ApiSource, DatabaseSource, FileFormat, FileSource, RssSource, SourceDescriptor, SourceSpec,
    SourceType,
};
pub use transform::{
    AggregateFunction, AggregateStep, FilterOperator, FilterStep, MapStep, TransformationStep,
};
