use crate::abi::EntryPoint;
use crate::library::TracerLibrary;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Resolves a configured library path to a loaded tracer plugin
pub trait LibraryLoader: Send + Sync {
    fn load(&self, library: &str) -> Result<Arc<TracerLibrary>>;
}

/// Loads plugins from shared libraries on disk
#[derive(Debug, Default, Clone, Copy)]
pub struct DlopenLoader;

impl LibraryLoader for DlopenLoader {
    fn load(&self, library: &str) -> Result<Arc<TracerLibrary>> {
        Ok(Arc::new(TracerLibrary::open(Path::new(library))?))
    }
}

/// Serves plugins linked into the binary under fixed library paths
///
/// Paths without a registration go to the fallback loader when one is set.
#[derive(Default)]
pub struct StaticLoader {
    entries: RwLock<HashMap<String, EntryPoint>>,
    fallback: Option<Arc<dyn LibraryLoader>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: Arc<dyn LibraryLoader>) -> Self {
        Self {
            entries: RwLock::default(),
            fallback: Some(fallback),
        }
    }

    /// Serve `entry` for the library path `library`
    pub fn register(&self, library: impl Into<String>, entry: EntryPoint) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(library.into(), entry);
    }

    pub fn is_registered(&self, library: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(library)
    }
}

impl LibraryLoader for StaticLoader {
    fn load(&self, library: &str) -> Result<Arc<TracerLibrary>> {
        let entry = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(library)
            .copied();

        match (entry, &self.fallback) {
            (Some(entry), _) => Ok(Arc::new(TracerLibrary::from_entry_point(library, entry)?)),
            (None, Some(fallback)) => fallback.load(library),
            (None, None) => Err(Error::NotRegistered(library.to_string())),
        }
    }
}
