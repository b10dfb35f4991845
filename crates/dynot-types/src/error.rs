use std::fmt;
use std::path::PathBuf;

/// Result type for dynot-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading and unpacking configuration
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// YAML parsing failed
    Yaml(serde_yaml::Error),

    /// JSON parsing or conversion failed
    Json(serde_json::Error),

    /// A typed config block has no `@type` entry
    MissingTypeUrl,

    /// The typed config names a different message than the one requested
    TypeMismatch { expected: String, actual: String },

    /// Strict validation found a field the message does not define
    UnknownField { message: String, field: String },

    /// A message failed its own validation rules
    Validation(String),

    /// Config file extension is neither JSON nor YAML
    UnsupportedFormat(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Yaml(err) => write!(f, "YAML error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::MissingTypeUrl => write!(f, "typed config is missing its '@type' entry"),
            Error::TypeMismatch { expected, actual } => write!(
                f,
                "typed config type mismatch: expected {}, got {}",
                expected, actual
            ),
            Error::UnknownField { message, field } => {
                write!(f, "{} has unknown field '{}'", message, field)
            }
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::UnsupportedFormat(path) => write!(
                f,
                "unsupported config format for {} (expected .yaml, .yml or .json)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::MissingTypeUrl
            | Error::TypeMismatch { .. }
            | Error::UnknownField { .. }
            | Error::Validation(_)
            | Error::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
