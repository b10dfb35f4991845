//! Mock tracer plugin.
//!
//! Built as a `cdylib` it is loadable by any dynot host; as an `rlib` its
//! [`ENTRY_POINT`] can be linked in directly. Configuration is a JSON object
//! with an `output_file`, which is created when the tracer is made; finished
//! spans are written there as a JSON array when the tracer is closed.

mod record;
mod tracer;

pub use record::{LogRecord, SpanRecord, read_spans};

use dynot_plugin::abi::{
    ABI_VERSION, EntryPoint, PluginApi, Sink, SpanHandle, StrRef, TracerHandle,
};
use tracer::{MockSpan, MockTracer};

pub const TRACER_NAME: &str = "mocktracer";

/// Text map key carrying the trace id (hex)
pub const TRACE_ID_KEY: &str = "ot-mock-traceid";

/// Text map key carrying the span id (hex)
pub const SPAN_ID_KEY: &str = "ot-mock-spanid";

/// Entry point for linking the plugin statically
pub const ENTRY_POINT: EntryPoint = dynot_tracer_plugin_v1;

static API: PluginApi = PluginApi {
    abi_version: ABI_VERSION,
    name: StrRef::from_static(TRACER_NAME),
    make_tracer,
    close_tracer,
    start_span,
    set_operation,
    set_tag,
    log,
    inject,
    finish_span,
};

/// # Safety
/// Called by the host through the plugin ABI.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dynot_tracer_plugin_v1(host_abi_version: u32) -> *const PluginApi {
    if host_abi_version != ABI_VERSION {
        return std::ptr::null();
    }
    &API
}

unsafe extern "C" fn make_tracer(config: StrRef, error: Sink) -> TracerHandle {
    let config = unsafe { config.as_str() };
    match MockTracer::from_json(&config) {
        Ok(tracer) => Box::into_raw(Box::new(tracer)).cast(),
        Err(message) => {
            unsafe { error.write(&message) };
            std::ptr::null_mut()
        }
    }
}

unsafe extern "C" fn close_tracer(tracer: TracerHandle) {
    if tracer.is_null() {
        return;
    }
    let tracer = unsafe { Box::from_raw(tracer.cast::<MockTracer>()) };
    if let Err(err) = tracer.close() {
        tracing::warn!(error = %err, "mocktracer failed to write spans");
    }
}

unsafe extern "C" fn start_span(
    tracer: TracerHandle,
    operation: StrRef,
    parent: StrRef,
    start_micros: u64,
) -> SpanHandle {
    let Some(tracer) = (unsafe { tracer.cast::<MockTracer>().as_ref() }) else {
        return std::ptr::null_mut();
    };
    let operation = unsafe { operation.as_str() }.into_owned();
    let parent = unsafe { parent.as_str() };

    match tracer.start_span(operation, &parent, start_micros) {
        Some(span) => Box::into_raw(Box::new(span)).cast(),
        None => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn set_operation(span: SpanHandle, operation: StrRef) {
    if let Some(span) = unsafe { span.cast::<MockSpan>().as_mut() } {
        span.set_operation(unsafe { operation.as_str() }.into_owned());
    }
}

unsafe extern "C" fn set_tag(span: SpanHandle, key: StrRef, value: StrRef) {
    if let Some(span) = unsafe { span.cast::<MockSpan>().as_mut() } {
        span.set_tag(
            unsafe { key.as_str() }.into_owned(),
            unsafe { value.as_str() }.into_owned(),
        );
    }
}

unsafe extern "C" fn log(span: SpanHandle, timestamp_micros: u64, event: StrRef) {
    if let Some(span) = unsafe { span.cast::<MockSpan>().as_mut() } {
        span.log(timestamp_micros, unsafe { event.as_str() }.into_owned());
    }
}

unsafe extern "C" fn inject(span: SpanHandle, out: Sink) -> i32 {
    let Some(span) = (unsafe { span.cast::<MockSpan>().as_ref() }) else {
        return 1;
    };
    unsafe { out.write(&span.context().encode()) };
    0
}

unsafe extern "C" fn finish_span(span: SpanHandle, finish_micros: u64) {
    if span.is_null() {
        return;
    }
    let span = unsafe { Box::from_raw(span.cast::<MockSpan>()) };
    span.finish(finish_micros);
}
