use dynot_plugin::{DlopenLoader, LibraryLoader};
use dynot_types::ValidationMode;
use std::fmt;
use std::sync::Arc;

/// Identity of the running proxy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalInfo {
    /// Tagged on every span as `node_id` when non-empty
    pub node_id: String,
}

/// Runtime feature switches consulted while building tracers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    /// Resolve deprecated extension names to their replacements
    pub allow_deprecated_extension_names: bool,
}

/// Server-wide facilities available to every factory
#[derive(Clone)]
pub struct ServerFactoryContext {
    pub local_info: LocalInfo,
    pub runtime: RuntimeFlags,
    pub loader: Arc<dyn LibraryLoader>,
}

impl Default for ServerFactoryContext {
    fn default() -> Self {
        Self {
            local_info: LocalInfo::default(),
            runtime: RuntimeFlags::default(),
            loader: Arc::new(DlopenLoader),
        }
    }
}

impl fmt::Debug for ServerFactoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerFactoryContext")
            .field("local_info", &self.local_info)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

/// Everything a tracer factory may use while building a driver
#[derive(Debug, Clone, Default)]
pub struct TracerFactoryContext {
    pub server: ServerFactoryContext,
    pub validation: ValidationMode,
}

impl TracerFactoryContext {
    pub fn new(server: ServerFactoryContext) -> Self {
        Self {
            server,
            validation: ValidationMode::default(),
        }
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn LibraryLoader>) -> Self {
        self.server.loader = loader;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeFlags) -> Self {
        self.server.runtime = runtime;
        self
    }

    pub fn loader(&self) -> &dyn LibraryLoader {
        self.server.loader.as_ref()
    }
}
