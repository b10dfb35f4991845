pub mod config;
pub mod dynamic_ot;
pub mod error;
pub mod message;
pub mod typed;

pub use config::{HttpTracerConfig, TracingConfig};
pub use dynamic_ot::DynamicOtConfig;
pub use error::{Error, Result};
pub use message::{ConfigMessage, Message, ValidationMode, downcast_message};
pub use typed::{TypedConfig, type_name_from_url};
