use crate::message::{ConfigMessage, ValidationMode};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TYPE_KEY: &str = "@type";

/// Wrapper types that carry another message as a plain struct
const TYPED_STRUCT_NAMES: &[&str] = &["udpa.type.v1.TypedStruct", "xds.type.v3.TypedStruct"];

/// A configuration block identified by a type URL
///
/// In YAML this is a mapping whose `@type` entry names the message and whose
/// remaining entries are the message fields:
///
/// ```yaml
/// "@type": type.googleapis.com/envoy.config.trace.v3.DynamicOtConfig
/// library: /usr/lib/libtracer.so
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TypedConfig {
    pub type_url: String,
    pub value: Map<String, Value>,
}

impl TypedConfig {
    pub fn new(type_url: impl Into<String>, value: Map<String, Value>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// Message name the type URL points at
    pub fn type_name(&self) -> Result<&str> {
        type_name_from_url(&self.type_url)
    }

    /// Convert into the concrete message `C`
    ///
    /// `TypedStruct` wrappers are unwrapped first. Fields unknown to `C` are
    /// rejected in strict mode and dropped in permissive mode. The message's
    /// own validation runs before it is returned.
    pub fn unpack<C: ConfigMessage>(&self, mode: ValidationMode) -> Result<C> {
        let (type_url, value) = self.resolve()?;
        let actual = type_name_from_url(type_url)?;
        if actual != C::TYPE_NAME {
            return Err(Error::TypeMismatch {
                expected: C::TYPE_NAME.to_string(),
                actual: actual.to_string(),
            });
        }

        let mut object = value;
        let unknown: Vec<String> = object
            .keys()
            .filter(|key| !C::FIELDS.contains(&key.as_str()))
            .cloned()
            .collect();

        for field in unknown {
            match mode {
                ValidationMode::Strict => {
                    return Err(Error::UnknownField {
                        message: C::TYPE_NAME.to_string(),
                        field,
                    });
                }
                ValidationMode::Permissive => {
                    tracing::warn!(
                        message = C::TYPE_NAME,
                        field = %field,
                        "ignoring unknown field in typed config"
                    );
                    object.remove(&field);
                }
            }
        }

        let message: C = serde_json::from_value(Value::Object(object))?;
        message.validate()?;
        Ok(message)
    }

    fn resolve(&self) -> Result<(&str, Map<String, Value>)> {
        let name = self.type_name()?;
        if !TYPED_STRUCT_NAMES.contains(&name) {
            return Ok((&self.type_url, self.value.clone()));
        }

        let inner_url = self
            .value
            .get("type_url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation(format!("{} is missing 'type_url'", name)))?;

        match self.value.get("value") {
            Some(Value::Object(inner)) => Ok((inner_url, inner.clone())),
            Some(_) => Err(Error::Validation(format!(
                "{} 'value' must be a struct",
                name
            ))),
            None => Ok((inner_url, Map::new())),
        }
    }
}

impl TryFrom<Map<String, Value>> for TypedConfig {
    type Error = Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self> {
        let type_url = match map.remove(TYPE_KEY) {
            Some(Value::String(url)) => url,
            Some(_) => {
                return Err(Error::Validation(
                    "'@type' must be a string".to_string(),
                ));
            }
            None => return Err(Error::MissingTypeUrl),
        };
        type_name_from_url(&type_url)?;

        Ok(Self {
            type_url,
            value: map,
        })
    }
}

impl From<TypedConfig> for Map<String, Value> {
    fn from(config: TypedConfig) -> Self {
        let mut map = config.value;
        map.insert(TYPE_KEY.to_string(), Value::String(config.type_url));
        map
    }
}

/// Extract the message name from a type URL
///
/// `type.googleapis.com/envoy.config.trace.v3.DynamicOtConfig` yields
/// `envoy.config.trace.v3.DynamicOtConfig`. A URL without `/` is taken as
/// the name itself.
pub fn type_name_from_url(url: &str) -> Result<&str> {
    let name = url.rsplit('/').next().unwrap_or(url);
    if name.is_empty() {
        return Err(Error::Validation(format!("invalid type URL '{}'", url)));
    }
    Ok(name)
}
