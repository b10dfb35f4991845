use crate::abi::{ABI_VERSION, EntryPoint, PluginApi, Sink, StrRef};
use crate::tracer::PluginTracer;
use crate::{Error, Result};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;

#[cfg(unix)]
use crate::dl::DynamicLibrary;

/// A tracer plugin whose ABI version has been negotiated
///
/// Either backed by a shared library opened at runtime or by an entry point
/// linked into the current binary. The function table stays valid for as
/// long as this value lives.
pub struct TracerLibrary {
    origin: String,
    name: String,
    api: NonNull<PluginApi>,
    #[cfg(unix)]
    _library: Option<DynamicLibrary>,
}

// The table is immutable and plugins must accept calls from any thread.
unsafe impl Send for TracerLibrary {}
unsafe impl Sync for TracerLibrary {}

impl std::fmt::Debug for TracerLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerLibrary")
            .field("origin", &self.origin)
            .field("name", &self.name)
            .finish()
    }
}

impl TracerLibrary {
    /// Open a plugin shared library and negotiate its ABI
    #[cfg(unix)]
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading tracer plugin");

        let library = DynamicLibrary::open(path)?;
        let symbol = library
            .symbol(crate::abi::ENTRY_POINT)
            .ok_or_else(|| Error::MissingEntryPoint {
                path: library.path().to_path_buf(),
                symbol: crate::abi::ENTRY_POINT.to_string(),
            })?;
        let entry: EntryPoint =
            unsafe { std::mem::transmute::<*mut std::ffi::c_void, EntryPoint>(symbol.as_ptr()) };

        let origin = path.display().to_string();
        let api = negotiate(&origin, entry)?;
        let mut plugin = Self::with_api(origin, api);
        plugin._library = Some(library);
        tracing::info!(
            path = %path.display(),
            tracer = %plugin.name,
            "loaded tracer plugin"
        );
        Ok(plugin)
    }

    #[cfg(not(unix))]
    pub fn open(path: &Path) -> Result<Self> {
        Err(Error::Unsupported(format!(
            "cannot load {}: dynamic tracer plugins require a unix platform",
            path.display()
        )))
    }

    /// Use a plugin linked into this binary
    pub fn from_entry_point(origin: impl Into<String>, entry: EntryPoint) -> Result<Self> {
        let origin = origin.into();
        let api = negotiate(&origin, entry)?;
        Ok(Self::with_api(origin, api))
    }

    fn with_api(origin: String, api: NonNull<PluginApi>) -> Self {
        let name = unsafe { api.as_ref().name.as_str() }.into_owned();
        Self {
            origin,
            name,
            api,
            #[cfg(unix)]
            _library: None,
        }
    }

    /// Path or label the plugin was loaded from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Tracer name the plugin reports
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn api(&self) -> &PluginApi {
        unsafe { self.api.as_ref() }
    }

    /// Ask the plugin for a tracer configured by `config_json`
    pub fn make_tracer(self: &Arc<Self>, config_json: &str) -> Result<PluginTracer> {
        let mut error = Vec::new();
        let handle = unsafe {
            (self.api().make_tracer)(StrRef::new(config_json), Sink::for_buffer(&mut error))
        };

        if handle.is_null() {
            let message = String::from_utf8_lossy(&error).trim().to_string();
            return Err(Error::MakeTracer(if message.is_empty() {
                format!("{} returned no tracer", self.name)
            } else {
                message
            }));
        }

        Ok(PluginTracer::new(Arc::clone(self), handle))
    }
}

fn negotiate(origin: &str, entry: EntryPoint) -> Result<NonNull<PluginApi>> {
    let table = unsafe { entry(ABI_VERSION) };
    let Some(api) = NonNull::new(table.cast_mut()) else {
        return Err(Error::AbiMismatch {
            plugin: origin.to_string(),
            host: ABI_VERSION,
            actual: None,
        });
    };

    let version = unsafe { api.as_ref().abi_version };
    if version != ABI_VERSION {
        return Err(Error::AbiMismatch {
            plugin: origin.to_string(),
            host: ABI_VERSION,
            actual: Some(version),
        });
    }
    Ok(api)
}
