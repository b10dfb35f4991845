use crate::context::TracerFactoryContext;
use crate::headers::RequestHeaders;
use crate::{Error, Result};
use dynot_types::{ConfigMessage, Message, TypedConfig, ValidationMode, downcast_message};
use std::sync::Arc;
use std::time::SystemTime;

/// Direction of the traced request relative to the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationName {
    #[default]
    Ingress,
    Egress,
}

impl OperationName {
    /// OpenTracing `span.kind` value for this direction
    pub fn span_kind(&self) -> &'static str {
        match self {
            OperationName::Ingress => "server",
            OperationName::Egress => "client",
        }
    }
}

/// Per-listener tracing settings handed to the driver with each span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanConfig {
    pub operation: OperationName,
}

/// Whether the request was selected for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub traced: bool,
}

impl Decision {
    pub fn traced() -> Self {
        Self { traced: true }
    }

    pub fn not_traced() -> Self {
        Self { traced: false }
    }
}

/// Creates spans for requests
///
/// Responsibilities:
/// - Extract an incoming span context from request headers
/// - Start a span (as a child of the extracted context, if any)
pub trait Driver: Send + Sync {
    fn start_span(
        &self,
        config: &SpanConfig,
        headers: &mut RequestHeaders,
        operation_name: &str,
        start_time: SystemTime,
        decision: Decision,
    ) -> Box<dyn Span>;
}

/// An active span
pub trait Span: Send {
    fn set_operation(&mut self, operation: &str);

    fn set_tag(&mut self, key: &str, value: &str);

    fn log(&mut self, timestamp: SystemTime, event: &str);

    /// Finish the span now; later calls are ignored
    fn finish_span(&mut self);

    /// Write this span's context into outgoing request headers
    fn inject_context(&mut self, headers: &mut RequestHeaders);

    fn spawn_child(
        &self,
        config: &SpanConfig,
        operation_name: &str,
        start_time: SystemTime,
    ) -> Box<dyn Span>;

    fn set_sampled(&mut self, sampled: bool);

    /// Trace id in hex, when the tracer exposes one
    fn trace_id(&self) -> Option<String> {
        None
    }
}

/// Span that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpan;

impl Span for NullSpan {
    fn set_operation(&mut self, _operation: &str) {}

    fn set_tag(&mut self, _key: &str, _value: &str) {}

    fn log(&mut self, _timestamp: SystemTime, _event: &str) {}

    fn finish_span(&mut self) {}

    fn inject_context(&mut self, _headers: &mut RequestHeaders) {}

    fn spawn_child(&self, _: &SpanConfig, _: &str, _: SystemTime) -> Box<dyn Span> {
        Box::new(NullSpan)
    }

    fn set_sampled(&mut self, _sampled: bool) {}
}

/// Builds tracer drivers from configuration
///
/// Responsibilities:
/// - Name the extension it is registered under
/// - Turn a typed config block into its config message
/// - Construct a driver from that message
pub trait TracerFactory: Send + Sync {
    /// Extension name (e.g., "envoy.tracers.dynamic_ot")
    fn name(&self) -> &'static str;

    /// Fully qualified name of the config message this factory accepts
    fn config_type(&self) -> &'static str;

    /// Config used when the tracer block carries no `typed_config`
    fn create_empty_config(&self) -> Box<dyn Message>;

    fn translate_config(
        &self,
        typed_config: &TypedConfig,
        mode: ValidationMode,
    ) -> Result<Box<dyn Message>>;

    fn create_tracer_driver(
        &self,
        config: &dyn Message,
        context: &TracerFactoryContext,
    ) -> Result<Arc<dyn Driver>>;
}

/// A tracer factory bound to one config message type
///
/// Implementors get [`TracerFactory`] for free; the config is unpacked and
/// downcast before `create_typed_driver` sees it.
pub trait TypedTracerFactory: Send + Sync + 'static {
    type Config: ConfigMessage;

    const NAME: &'static str;

    fn create_typed_driver(
        &self,
        config: &Self::Config,
        context: &TracerFactoryContext,
    ) -> Result<Arc<dyn Driver>>;
}

impl<F: TypedTracerFactory> TracerFactory for F {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn config_type(&self) -> &'static str {
        <F::Config as ConfigMessage>::TYPE_NAME
    }

    fn create_empty_config(&self) -> Box<dyn Message> {
        Box::new(F::Config::default())
    }

    fn translate_config(
        &self,
        typed_config: &TypedConfig,
        mode: ValidationMode,
    ) -> Result<Box<dyn Message>> {
        let config: F::Config = typed_config.unpack(mode)?;
        Ok(Box::new(config))
    }

    fn create_tracer_driver(
        &self,
        config: &dyn Message,
        context: &TracerFactoryContext,
    ) -> Result<Arc<dyn Driver>> {
        let typed = downcast_message::<F::Config>(config).ok_or_else(|| {
            Error::ConfigTypeMismatch {
                factory: F::NAME.to_string(),
                expected: <F::Config as ConfigMessage>::TYPE_NAME.to_string(),
                actual: config.type_name().to_string(),
            }
        })?;
        self.create_typed_driver(typed, context)
    }
}
