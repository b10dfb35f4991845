use std::fmt;
use std::path::PathBuf;

/// Result type for dynot-plugin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or driving a plugin
#[derive(Debug)]
pub enum Error {
    /// The shared library could not be opened
    Load { path: PathBuf, message: String },

    /// The library does not export the plugin entry point
    MissingEntryPoint { path: PathBuf, symbol: String },

    /// Plugin and host disagree on the ABI version
    AbiMismatch { plugin: String, host: u32, actual: Option<u32> },

    /// The plugin refused the tracer configuration
    MakeTracer(String),

    /// A span could not be started (e.g. undecodable parent context)
    StartSpan(String),

    /// The plugin failed to serialize a span context
    Inject(String),

    /// A text map could not be decoded
    MalformedTextMap(String),

    /// No library registered under the requested path
    NotRegistered(String),

    /// Dynamic loading is not available on this platform
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Load { path, message } => {
                write!(f, "{} failed to load: {}", path.display(), message)
            }
            Error::MissingEntryPoint { path, symbol } => write!(
                f,
                "{} does not export tracer plugin entry point '{}'",
                path.display(),
                symbol
            ),
            Error::AbiMismatch {
                plugin,
                host,
                actual,
            } => match actual {
                Some(version) => write!(
                    f,
                    "plugin {} implements ABI version {}, host requires {}",
                    plugin, version, host
                ),
                None => write!(
                    f,
                    "plugin {} does not support ABI version {}",
                    plugin, host
                ),
            },
            Error::MakeTracer(msg) => write!(f, "failed to create tracer: {}", msg),
            Error::StartSpan(msg) => write!(f, "failed to start span: {}", msg),
            Error::Inject(msg) => write!(f, "failed to inject span context: {}", msg),
            Error::MalformedTextMap(line) => write!(f, "malformed text map entry '{}'", line),
            Error::NotRegistered(path) => {
                write!(f, "no tracer plugin registered for '{}'", path)
            }
            Error::Unsupported(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
