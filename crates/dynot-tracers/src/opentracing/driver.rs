use super::span::OpenTracingSpan;
use crate::headers::RequestHeaders;
use crate::traits::{Decision, Driver, NullSpan, Span, SpanConfig};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dynot_plugin::{PluginTracer, TextMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Header carrying the base64 span context in single-header propagation
pub const SPAN_CONTEXT_HEADER: &str = "x-ot-span-context";

/// Span tag naming the node that recorded the span
pub const NODE_ID_TAG: &str = "node_id";

/// How span contexts travel in request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationMode {
    /// The whole context in one `x-ot-span-context` header
    SingleHeader,
    /// The tracer's own headers, as written by the plugin
    TracerNative,
}

/// Counters shared by a driver and all of its spans
#[derive(Debug, Default)]
pub struct DriverStats {
    span_context_extraction_error: AtomicU64,
    span_context_injection_error: AtomicU64,
}

/// Point-in-time copy of [`DriverStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStatsSnapshot {
    pub span_context_extraction_error: u64,
    pub span_context_injection_error: u64,
}

impl DriverStats {
    pub(crate) fn record_extraction_error(&self) {
        self.span_context_extraction_error
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_injection_error(&self) {
        self.span_context_injection_error
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DriverStatsSnapshot {
        DriverStatsSnapshot {
            span_context_extraction_error: self
                .span_context_extraction_error
                .load(Ordering::Relaxed),
            span_context_injection_error: self.span_context_injection_error.load(Ordering::Relaxed),
        }
    }
}

/// State a span needs from the driver that created it
pub(crate) struct DriverShared {
    pub(crate) mode: PropagationMode,
    pub(crate) stats: DriverStats,
}

/// Driver over any OpenTracing tracer reachable through the plugin ABI
pub struct OpenTracingDriver {
    tracer: PluginTracer,
    shared: Arc<DriverShared>,
    node_id: Option<String>,
}

impl OpenTracingDriver {
    pub fn new(tracer: PluginTracer, mode: PropagationMode) -> Self {
        Self {
            tracer,
            shared: Arc::new(DriverShared {
                mode,
                stats: DriverStats::default(),
            }),
            node_id: None,
        }
    }

    /// Tag every span with `node_id`; an empty id disables the tag
    pub fn with_node_id(mut self, node_id: &str) -> Self {
        self.node_id = (!node_id.is_empty()).then(|| node_id.to_string());
        self
    }

    pub fn tracer(&self) -> &PluginTracer {
        &self.tracer
    }

    pub fn propagation_mode(&self) -> PropagationMode {
        self.shared.mode
    }

    pub fn stats(&self) -> DriverStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Read the incoming context; `None` counts as a root request
    fn extract(&self, headers: &RequestHeaders) -> Option<TextMap> {
        match self.shared.mode {
            PropagationMode::SingleHeader => {
                let value = headers.get(SPAN_CONTEXT_HEADER)?;
                match decode_single_header(value) {
                    Some(context) => Some(context),
                    None => {
                        tracing::debug!("undecodable {} header", SPAN_CONTEXT_HEADER);
                        self.shared.stats.record_extraction_error();
                        None
                    }
                }
            }
            PropagationMode::TracerNative => Some(headers.iter().collect()),
        }
    }
}

impl Driver for OpenTracingDriver {
    fn start_span(
        &self,
        config: &SpanConfig,
        headers: &mut RequestHeaders,
        operation_name: &str,
        start_time: SystemTime,
        decision: Decision,
    ) -> Box<dyn Span> {
        let parent = self.extract(headers);
        let span = match self
            .tracer
            .start_span(operation_name, parent.as_ref(), start_time)
        {
            Ok(span) => Ok(span),
            Err(err) if parent.is_some() => {
                tracing::debug!(error = %err, "failed to extract span context");
                self.shared.stats.record_extraction_error();
                self.tracer.start_span(operation_name, None, start_time)
            }
            Err(err) => Err(err),
        };

        let span = match span {
            Ok(span) => span,
            Err(err) => {
                tracing::warn!(error = %err, operation = operation_name, "tracer refused to start span");
                return Box::new(NullSpan);
            }
        };

        let mut span = OpenTracingSpan::new(Arc::clone(&self.shared), span);
        span.set_tag("span.kind", config.operation.span_kind());
        if let Some(node_id) = &self.node_id {
            span.set_tag(NODE_ID_TAG, node_id);
        }
        if !decision.traced {
            span.set_sampled(false);
        }
        Box::new(span)
    }
}

pub(crate) fn encode_single_header(context: &TextMap) -> String {
    STANDARD.encode(context.encode())
}

fn decode_single_header(value: &str) -> Option<TextMap> {
    let bytes = STANDARD.decode(value.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    TextMap::decode(&text).ok()
}
