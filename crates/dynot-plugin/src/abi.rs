//! The C ABI shared by the host and tracer plugins.
//!
//! A plugin library exports one symbol, [`ENTRY_POINT`], with the
//! [`EntryPoint`] signature. The host calls it with the ABI version it speaks
//! and receives a table of function pointers, or null when the plugin cannot
//! serve that version. Nothing but `#[repr(C)]` data and `extern "C"`
//! functions crosses the boundary, so host and plugin may be built by
//! different compilers.
//!
//! Ownership rules:
//! - [`StrRef`] is always borrowed for the duration of a single call.
//! - Output travels through a [`Sink`] supplied by the caller, so every byte
//!   the host reads lives in host-owned memory.
//! - `make_tracer` and `start_span` return opaque handles owned by the
//!   plugin; `close_tracer` and `finish_span` consume them.
//! - Span contexts travel as a text map: `key\tvalue\n` lines.

use std::ffi::c_void;

/// ABI version implemented by this crate
pub const ABI_VERSION: u32 = 1;

/// Symbol every plugin library must export
pub const ENTRY_POINT: &str = "dynot_tracer_plugin_v1";

/// Signature of [`ENTRY_POINT`]
pub type EntryPoint = unsafe extern "C" fn(host_abi_version: u32) -> *const PluginApi;

/// Borrowed UTF-8 string
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StrRef {
    pub ptr: *const u8,
    pub len: usize,
}

impl StrRef {
    pub const EMPTY: StrRef = StrRef {
        ptr: std::ptr::null(),
        len: 0,
    };

    pub const fn from_static(value: &'static str) -> Self {
        Self {
            ptr: value.as_ptr(),
            len: value.len(),
        }
    }

    pub fn new(value: &str) -> Self {
        Self {
            ptr: value.as_ptr(),
            len: value.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// View the referenced bytes as a string
    ///
    /// Invalid UTF-8 is replaced rather than trusted.
    ///
    /// # Safety
    /// `ptr` must be null or valid for reads of `len` bytes for `'a`.
    pub unsafe fn as_str<'a>(&self) -> std::borrow::Cow<'a, str> {
        if self.is_empty() {
            return std::borrow::Cow::Borrowed("");
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len) };
        String::from_utf8_lossy(bytes)
    }
}

/// Write callback supplied by the caller of a plugin function
#[repr(C)]
pub struct Sink {
    pub ctx: *mut c_void,
    pub write: unsafe extern "C" fn(ctx: *mut c_void, data: StrRef),
}

impl Sink {
    /// A sink appending to `buffer`
    ///
    /// The sink must not outlive `buffer`.
    pub fn for_buffer(buffer: &mut Vec<u8>) -> Self {
        Self {
            ctx: (buffer as *mut Vec<u8>).cast(),
            write: write_to_buffer,
        }
    }

    /// Send `data` to the caller
    ///
    /// # Safety
    /// The sink must have been built by the caller for the current call.
    pub unsafe fn write(&self, data: &str) {
        unsafe { (self.write)(self.ctx, StrRef::new(data)) }
    }
}

unsafe extern "C" fn write_to_buffer(ctx: *mut c_void, data: StrRef) {
    if ctx.is_null() || data.is_empty() {
        return;
    }
    let buffer = unsafe { &mut *ctx.cast::<Vec<u8>>() };
    let bytes = unsafe { std::slice::from_raw_parts(data.ptr, data.len) };
    buffer.extend_from_slice(bytes);
}

/// Opaque tracer handle owned by the plugin
pub type TracerHandle = *mut c_void;

/// Opaque span handle owned by the plugin
pub type SpanHandle = *mut c_void;

/// Function table a plugin hands to the host
#[repr(C)]
pub struct PluginApi {
    /// Version of this table layout; must equal the version the host asked for
    pub abi_version: u32,

    /// Human readable tracer name
    pub name: StrRef,

    /// Build a tracer from a JSON config; null on failure with a message in `error`
    pub make_tracer: unsafe extern "C" fn(config: StrRef, error: Sink) -> TracerHandle,

    /// Flush and destroy a tracer
    pub close_tracer: unsafe extern "C" fn(tracer: TracerHandle),

    /// Start a span; `parent` is an encoded text map carrier, possibly empty.
    /// A carrier without a context starts a new trace. Returns null when the
    /// carrier holds a context that cannot be decoded.
    pub start_span: unsafe extern "C" fn(
        tracer: TracerHandle,
        operation: StrRef,
        parent: StrRef,
        start_micros: u64,
    ) -> SpanHandle,

    pub set_operation: unsafe extern "C" fn(span: SpanHandle, operation: StrRef),

    pub set_tag: unsafe extern "C" fn(span: SpanHandle, key: StrRef, value: StrRef),

    pub log: unsafe extern "C" fn(span: SpanHandle, timestamp_micros: u64, event: StrRef),

    /// Write the span context as an encoded text map; non-zero on failure
    pub inject: unsafe extern "C" fn(span: SpanHandle, out: Sink) -> i32,

    /// Record the span as finished and destroy the handle
    pub finish_span: unsafe extern "C" fn(span: SpanHandle, finish_micros: u64),
}

// The table is immutable function pointers and a 'static name.
unsafe impl Sync for PluginApi {}
unsafe impl Send for PluginApi {}
