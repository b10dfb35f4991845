//! Tracer plugins behind a versioned C ABI.
//!
//! The [`abi`] module is the contract a plugin library implements. The rest
//! of the crate is the host side: opening libraries, negotiating the ABI
//! version and wrapping the raw handles in owned Rust types.

pub mod abi;
#[cfg(unix)]
mod dl;
pub mod error;
pub mod library;
pub mod loader;
pub mod text_map;
pub mod tracer;

pub use abi::{ABI_VERSION, ENTRY_POINT, EntryPoint, PluginApi};
pub use error::{Error, Result};
pub use library::TracerLibrary;
pub use loader::{DlopenLoader, LibraryLoader, StaticLoader};
pub use text_map::TextMap;
pub use tracer::{PluginSpan, PluginTracer, to_micros};
