use super::driver::{DriverShared, PropagationMode, SPAN_CONTEXT_HEADER, encode_single_header};
use crate::headers::RequestHeaders;
use crate::traits::{NullSpan, Span, SpanConfig};
use dynot_plugin::{PluginSpan, TextMap};
use std::sync::Arc;
use std::time::SystemTime;

/// OpenTracing tag marking a span as sampled (1) or not (0)
pub const SAMPLING_PRIORITY_TAG: &str = "sampling.priority";

/// Span backed by a plugin tracer
pub struct OpenTracingSpan {
    shared: Arc<DriverShared>,
    span: PluginSpan,
}

impl OpenTracingSpan {
    pub(crate) fn new(shared: Arc<DriverShared>, span: PluginSpan) -> Self {
        Self { shared, span }
    }

    fn context(&self) -> Option<TextMap> {
        match self.span.inject() {
            Ok(context) => Some(context),
            Err(err) => {
                tracing::debug!(error = %err, "failed to inject span context");
                self.shared.stats.record_injection_error();
                None
            }
        }
    }
}

impl Span for OpenTracingSpan {
    fn set_operation(&mut self, operation: &str) {
        self.span.set_operation(operation);
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        self.span.set_tag(key, value);
    }

    fn log(&mut self, timestamp: SystemTime, event: &str) {
        self.span.log(timestamp, event);
    }

    fn finish_span(&mut self) {
        self.span.finish(SystemTime::now());
    }

    fn inject_context(&mut self, headers: &mut RequestHeaders) {
        let Some(context) = self.context() else {
            return;
        };

        match self.shared.mode {
            PropagationMode::SingleHeader => {
                headers.set(SPAN_CONTEXT_HEADER, encode_single_header(&context));
            }
            PropagationMode::TracerNative => {
                for (name, value) in context.iter() {
                    headers.set(name, value);
                }
            }
        }
    }

    fn spawn_child(
        &self,
        _config: &SpanConfig,
        operation_name: &str,
        start_time: SystemTime,
    ) -> Box<dyn Span> {
        let parent = self.context();
        match self
            .span
            .tracer()
            .start_span(operation_name, parent.as_ref(), start_time)
        {
            Ok(child) => Box::new(OpenTracingSpan::new(Arc::clone(&self.shared), child)),
            Err(err) => {
                tracing::warn!(error = %err, operation = operation_name, "failed to spawn child span");
                Box::new(NullSpan)
            }
        }
    }

    fn set_sampled(&mut self, sampled: bool) {
        self.span
            .set_tag(SAMPLING_PRIORITY_TAG, if sampled { "1" } else { "0" });
    }
}
