use std::fmt;

/// Result type for dynot-tracers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building tracer drivers
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be parsed, unpacked or validated
    Config(dynot_types::Error),

    /// A tracer library could not be loaded or refused its configuration
    Library {
        library: String,
        source: dynot_plugin::Error,
    },

    /// No factory registered under the requested name
    UnknownFactory(String),

    /// A factory is already registered under this name
    DuplicateFactory(String),

    /// A factory received a config message of the wrong type
    ConfigTypeMismatch {
        factory: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => write!(f, "Configuration error: {}", err),
            Error::Library { library, source } => {
                write!(f, "tracer library '{}': {}", library, source)
            }
            Error::UnknownFactory(name) => {
                write!(f, "Didn't find a registered tracer factory for '{}'", name)
            }
            Error::DuplicateFactory(name) => {
                write!(f, "tracer factory '{}' is already registered", name)
            }
            Error::ConfigTypeMismatch {
                factory,
                expected,
                actual,
            } => write!(
                f,
                "tracer factory '{}' expects {} but was given {}",
                factory, expected, actual
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Library { source, .. } => Some(source),
            Error::UnknownFactory(_)
            | Error::DuplicateFactory(_)
            | Error::ConfigTypeMismatch { .. } => None,
        }
    }
}

impl From<dynot_types::Error> for Error {
    fn from(err: dynot_types::Error) -> Self {
        Error::Config(err)
    }
}
