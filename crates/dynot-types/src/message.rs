use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// How strictly typed configs are checked against their message definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Unknown fields are rejected
    #[default]
    Strict,
    /// Unknown fields are dropped with a warning
    Permissive,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Strict => write!(f, "strict"),
            ValidationMode::Permissive => write!(f, "permissive"),
        }
    }
}

/// Object-safe view of a configuration message
///
/// Factories receive their configuration as `&dyn Message` and downcast it
/// to the concrete type they registered for.
pub trait Message: fmt::Debug + Send + Sync + 'static {
    /// Fully qualified message name (e.g. `envoy.config.trace.v3.DynamicOtConfig`)
    fn type_name(&self) -> &'static str;

    /// Check message-level constraints
    fn validate(&self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// A configuration message that can be unpacked from a typed config block
pub trait ConfigMessage: Message + DeserializeOwned + Default + Clone {
    const TYPE_NAME: &'static str;

    /// Field names the message defines, used for unknown-field detection
    const FIELDS: &'static [&'static str];
}

/// Downcast a message to a concrete config type
pub fn downcast_message<C: ConfigMessage>(message: &dyn Message) -> Option<&C> {
    message.as_any().downcast_ref::<C>()
}
