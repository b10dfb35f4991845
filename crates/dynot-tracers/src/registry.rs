use crate::context::RuntimeFlags;
use crate::dynamic_ot::DynamicOpenTracingTracerFactory;
use crate::traits::TracerFactory;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Deprecated extension names and the names that replaced them
const DEPRECATED_NAMES: &[(&str, &str)] = &[("envoy.dynamic.ot", "envoy.tracers.dynamic_ot")];

static GLOBAL: Lazy<FactoryRegistry> = Lazy::new(FactoryRegistry::with_builtin_factories);

/// Process-wide registry holding the built-in tracer factories
pub fn global() -> &'static FactoryRegistry {
    &GLOBAL
}

/// Tracer factories keyed by extension name
#[derive(Default)]
pub struct FactoryRegistry {
    entries: RwLock<Entries>,
}

/// Factories and aliases share one namespace, so both live under one lock
#[derive(Default)]
struct Entries {
    factories: BTreeMap<String, Arc<dyn TracerFactory>>,
    deprecated: BTreeMap<String, String>,
}

impl Entries {
    fn is_taken(&self, name: &str) -> bool {
        self.factories.contains_key(name) || self.deprecated.contains_key(name)
    }
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every factory this crate ships and their deprecated aliases
    pub fn with_builtin_factories() -> Self {
        let mut entries = Entries::default();
        let factory: Arc<dyn TracerFactory> = Arc::new(DynamicOpenTracingTracerFactory);
        entries.factories.insert(factory.name().to_string(), factory);
        for (deprecated, canonical) in DEPRECATED_NAMES {
            entries
                .deprecated
                .insert(deprecated.to_string(), canonical.to_string());
        }
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Add a factory; fails if the name is taken by a factory or an alias
    pub fn register(&self, factory: Arc<dyn TracerFactory>) -> Result<()> {
        let name = factory.name();
        let mut entries = self.write();
        if entries.is_taken(name) {
            return Err(Error::DuplicateFactory(name.to_string()));
        }
        entries.factories.insert(name.to_string(), factory);
        tracing::debug!(factory = name, "registered tracer factory");
        Ok(())
    }

    /// Declare `deprecated` as an old name of the factory registered as `canonical`
    pub fn register_deprecated_name(&self, deprecated: &str, canonical: &str) -> Result<()> {
        let mut entries = self.write();
        if entries.is_taken(deprecated) {
            return Err(Error::DuplicateFactory(deprecated.to_string()));
        }
        entries
            .deprecated
            .insert(deprecated.to_string(), canonical.to_string());
        Ok(())
    }

    /// Look up a factory by its current name
    ///
    /// Deprecated names are never resolved here.
    pub fn get_factory(&self, name: &str) -> Option<Arc<dyn TracerFactory>> {
        self.read().factories.get(name).cloned()
    }

    /// Look up a factory, resolving deprecated names when the runtime allows it
    pub fn get_factory_with_runtime(
        &self,
        name: &str,
        runtime: &RuntimeFlags,
    ) -> Option<Arc<dyn TracerFactory>> {
        let entries = self.read();
        if let Some(factory) = entries.factories.get(name) {
            return Some(Arc::clone(factory));
        }

        let canonical = entries.deprecated.get(name)?;
        if !runtime.allow_deprecated_extension_names {
            tracing::warn!(
                name,
                replacement = %canonical,
                "deprecated tracer extension name is disabled"
            );
            return None;
        }

        tracing::warn!(
            name,
            replacement = %canonical,
            "using deprecated tracer extension name"
        );
        entries.factories.get(canonical).cloned()
    }

    /// Registered factory names, sorted
    pub fn names(&self) -> Vec<String> {
        self.read().factories.keys().cloned().collect()
    }

    /// `(deprecated, canonical)` pairs, sorted by deprecated name
    pub fn deprecated_names(&self) -> Vec<(String, String)> {
        self.read()
            .deprecated
            .iter()
            .map(|(deprecated, canonical)| (deprecated.clone(), canonical.clone()))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
