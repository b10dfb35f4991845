use crate::abi::{Sink, SpanHandle, StrRef, TracerHandle};
use crate::library::TracerLibrary;
use crate::text_map::TextMap;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

struct TracerInner {
    library: Arc<TracerLibrary>,
    handle: TracerHandle,
}

// Plugins must accept tracer calls from any thread.
unsafe impl Send for TracerInner {}
unsafe impl Sync for TracerInner {}

impl Drop for TracerInner {
    fn drop(&mut self) {
        tracing::debug!(tracer = %self.library.name(), "closing plugin tracer");
        unsafe { (self.library.api().close_tracer)(self.handle) }
    }
}

/// A tracer instance living inside a plugin
///
/// Cloning shares the instance. The plugin tracer is closed once the last
/// clone and every span started from it are gone.
#[derive(Clone)]
pub struct PluginTracer {
    inner: Arc<TracerInner>,
}

impl std::fmt::Debug for PluginTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginTracer")
            .field("library", &self.inner.library)
            .finish()
    }
}

impl PluginTracer {
    pub(crate) fn new(library: Arc<TracerLibrary>, handle: TracerHandle) -> Self {
        Self {
            inner: Arc::new(TracerInner { library, handle }),
        }
    }

    pub fn library(&self) -> &TracerLibrary {
        &self.inner.library
    }

    /// Start a span, as a child of `parent` when given
    pub fn start_span(
        &self,
        operation: &str,
        parent: Option<&TextMap>,
        start: SystemTime,
    ) -> Result<PluginSpan> {
        let encoded_parent = parent.map(TextMap::encode).unwrap_or_default();
        let api = self.inner.library.api();
        let handle = unsafe {
            (api.start_span)(
                self.inner.handle,
                StrRef::new(operation),
                StrRef::new(&encoded_parent),
                to_micros(start),
            )
        };

        if handle.is_null() {
            return Err(Error::StartSpan(format!(
                "{} rejected parent context for '{}'",
                self.inner.library.name(),
                operation
            )));
        }

        Ok(PluginSpan {
            tracer: Arc::clone(&self.inner),
            handle,
            finished: false,
            final_context: None,
        })
    }
}

/// A span living inside a plugin
///
/// Dropping an unfinished span finishes it at the time of the drop. The
/// context stays available after finishing, so late children and injections
/// still join the trace.
pub struct PluginSpan {
    tracer: Arc<TracerInner>,
    handle: SpanHandle,
    finished: bool,
    final_context: Option<TextMap>,
}

// Span handles are only touched through `&mut self` or on drop.
unsafe impl Send for PluginSpan {}

impl PluginSpan {
    /// The tracer that started this span
    pub fn tracer(&self) -> PluginTracer {
        PluginTracer {
            inner: Arc::clone(&self.tracer),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn set_operation(&mut self, operation: &str) {
        if self.finished {
            return;
        }
        unsafe { (self.tracer.library.api().set_operation)(self.handle, StrRef::new(operation)) }
    }

    pub fn set_tag(&mut self, key: &str, value: &str) {
        if self.finished {
            return;
        }
        unsafe {
            (self.tracer.library.api().set_tag)(self.handle, StrRef::new(key), StrRef::new(value))
        }
    }

    pub fn log(&mut self, timestamp: SystemTime, event: &str) {
        if self.finished {
            return;
        }
        unsafe {
            (self.tracer.library.api().log)(self.handle, to_micros(timestamp), StrRef::new(event))
        }
    }

    /// Serialize this span's context
    pub fn inject(&self) -> Result<TextMap> {
        if self.finished {
            return self.final_context.clone().ok_or_else(|| {
                Error::Inject("span finished without a recorded context".to_string())
            });
        }
        self.inject_live()
    }

    fn inject_live(&self) -> Result<TextMap> {
        let mut out = Vec::new();
        let status =
            unsafe { (self.tracer.library.api().inject)(self.handle, Sink::for_buffer(&mut out)) };
        if status != 0 {
            return Err(Error::Inject(format!(
                "{} returned status {}",
                self.tracer.library.name(),
                status
            )));
        }

        TextMap::decode(&String::from_utf8_lossy(&out))
    }

    /// Finish the span; later calls are ignored
    pub fn finish(&mut self, at: SystemTime) {
        if self.finished {
            return;
        }
        // The plugin destroys the handle on finish.
        self.final_context = match self.inject_live() {
            Ok(context) => Some(context),
            Err(err) => {
                tracing::debug!(error = %err, "span context unavailable at finish");
                None
            }
        };
        self.finished = true;
        unsafe { (self.tracer.library.api().finish_span)(self.handle, to_micros(at)) }
    }
}

impl Drop for PluginSpan {
    fn drop(&mut self) {
        self.finish(SystemTime::now());
    }
}

/// Microseconds since the Unix epoch; times before the epoch clamp to zero
pub fn to_micros(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros() as u64)
        .unwrap_or(0)
}
