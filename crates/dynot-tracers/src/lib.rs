//! Tracer factories and the drivers they build.
//!
//! A [`TracingConfig`](dynot_types::TracingConfig) names a factory in the
//! [`FactoryRegistry`]; the factory translates its typed config block and
//! constructs a [`Driver`]. The dynamic OpenTracing factory loads the tracer
//! itself from a plugin library.

pub mod context;
pub mod dynamic_ot;
pub mod error;
pub mod headers;
pub mod opentracing;
pub mod registry;
pub mod traits;
pub mod translate;

pub use context::{LocalInfo, RuntimeFlags, ServerFactoryContext, TracerFactoryContext};
pub use dynamic_ot::{DYNAMIC_OT_NAME, DynamicOpenTracingDriver, DynamicOpenTracingTracerFactory};
pub use error::{Error, Result};
pub use headers::RequestHeaders;
pub use opentracing::{
    DriverStatsSnapshot, OpenTracingDriver, OpenTracingSpan, PropagationMode, SPAN_CONTEXT_HEADER,
};
pub use registry::{FactoryRegistry, global};
pub use traits::{
    Decision, Driver, NullSpan, OperationName, Span, SpanConfig, TracerFactory, TypedTracerFactory,
};
pub use translate::{create_http_tracer, translate_to_factory_config};
