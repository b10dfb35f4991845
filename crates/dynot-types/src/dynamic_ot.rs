use crate::message::{ConfigMessage, Message};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;

/// Configuration for a tracer loaded from an OpenTracing plugin library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicOtConfig {
    /// Path of the shared library implementing the tracer
    #[serde(default)]
    pub library: String,

    /// Tracer-specific configuration, handed to the plugin as JSON
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl DynamicOtConfig {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            config: Map::new(),
        }
    }

    /// The tracer configuration as the compact JSON document the plugin receives
    pub fn config_json(&self) -> String {
        Value::Object(self.config.clone()).to_string()
    }
}

impl Message for DynamicOtConfig {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn validate(&self) -> Result<()> {
        if self.library.is_empty() {
            return Err(Error::Validation(format!(
                "{}.library: value length must be at least 1",
                Self::TYPE_NAME
            )));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ConfigMessage for DynamicOtConfig {
    const TYPE_NAME: &'static str = "envoy.config.trace.v3.DynamicOtConfig";
    const FIELDS: &'static [&'static str] = &["library", "config"];
}
