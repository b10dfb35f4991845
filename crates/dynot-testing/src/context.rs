//! Factory contexts wired to the in-process mock tracer.

use dynot_plugin::{DlopenLoader, StaticLoader};
use dynot_tracers::{LocalInfo, RuntimeFlags, ServerFactoryContext, TracerFactoryContext};
use dynot_types::ValidationMode;
use std::sync::Arc;

/// Library path the mock tracer is served under
///
/// Nothing exists at this path; the loader resolves it to the mock tracer
/// linked into the test binary.
pub const MOCKTRACER_LIBRARY: &str = "mocktracer/libmocktracer_plugin.so";

/// Builder for a [`TracerFactoryContext`] whose loader knows the mock tracer
///
/// # Example
/// ```no_run
/// use dynot_testing::MockTracerFactoryContext;
///
/// let context = MockTracerFactoryContext::new()
///     .allow_deprecated_extension_names(true)
///     .build();
/// ```
pub struct MockTracerFactoryContext {
    loader: Arc<StaticLoader>,
    runtime: RuntimeFlags,
    validation: ValidationMode,
    local_info: LocalInfo,
}

impl Default for MockTracerFactoryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTracerFactoryContext {
    /// Context serving the mock at [`MOCKTRACER_LIBRARY`]; other paths go to dlopen
    pub fn new() -> Self {
        let loader = StaticLoader::with_fallback(Arc::new(DlopenLoader));
        loader.register(MOCKTRACER_LIBRARY, dynot_mocktracer::ENTRY_POINT);

        Self {
            loader: Arc::new(loader),
            runtime: RuntimeFlags::default(),
            validation: ValidationMode::Strict,
            local_info: LocalInfo {
                node_id: "test-node".to_string(),
            },
        }
    }

    /// Serve the mock under an additional path
    pub fn with_library(self, path: &str) -> Self {
        self.loader.register(path, dynot_mocktracer::ENTRY_POINT);
        self
    }

    pub fn allow_deprecated_extension_names(mut self, allow: bool) -> Self {
        self.runtime.allow_deprecated_extension_names = allow;
        self
    }

    pub fn validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn loader(&self) -> Arc<StaticLoader> {
        Arc::clone(&self.loader)
    }

    pub fn build(&self) -> TracerFactoryContext {
        let server = ServerFactoryContext {
            local_info: self.local_info.clone(),
            runtime: self.runtime,
            loader: self.loader.clone(),
        };
        TracerFactoryContext::new(server).with_validation(self.validation)
    }
}
