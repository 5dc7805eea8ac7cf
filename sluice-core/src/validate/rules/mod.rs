pub(crate) mod invocation;
pub(crate) mod source;
pub(crate) mod transform;
