use crate::typed::TypedConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level tracing configuration
///
/// Only HTTP tracing is configurable. An absent `http` block means requests
/// are not traced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpTracerConfig>,
}

/// Selects a tracer factory by extension name and carries its typed config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpTracerConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typed_config: Option<TypedConfig>,
}

impl TracingConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a config file, choosing the format by extension
    pub fn load_from(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&std::fs::read_to_string(path)?),
            Some("json") => Self::from_json(&std::fs::read_to_string(path)?),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const YAML: &str = r#"
  http:
    name: envoy.tracers.dynamic_ot
    typed_config:
      "@type": type.googleapis.com/envoy.config.trace.v3.DynamicOtConfig
      library: /opt/tracers/libmocktracer_plugin.so
      config:
        output_file: fake_file
  "#;

    #[test]
    fn test_parse_indented_yaml_block() -> Result<()> {
        let config = TracingConfig::from_yaml(YAML)?;
        let http = config.http.expect("http block");

        assert_eq!(http.name, "envoy.tracers.dynamic_ot");
        let typed = http.typed_config.expect("typed config");
        assert_eq!(typed.type_name()?, "envoy.config.trace.v3.DynamicOtConfig");
        assert_eq!(typed.value["library"], "/opt/tracers/libmocktracer_plugin.so");
        assert_eq!(typed.value["config"]["output_file"], "fake_file");
        Ok(())
    }

    #[test]
    fn test_empty_document_has_no_http_tracer() -> Result<()> {
        let config = TracingConfig::from_yaml("{}")?;
        assert!(config.http.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let result = TracingConfig::from_yaml("grpc:\n  name: foo\n");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_load_from_picks_format_by_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;

        let yaml_path = temp_dir.path().join("tracing.yaml");
        std::fs::write(&yaml_path, YAML)?;
        assert!(TracingConfig::load_from(&yaml_path)?.http.is_some());

        let json_path = temp_dir.path().join("tracing.json");
        std::fs::write(
            &json_path,
            r#"{"http": {"name": "envoy.tracers.dynamic_ot"}}"#,
        )?;
        let http = TracingConfig::load_from(&json_path)?.http.unwrap();
        assert!(http.typed_config.is_none());

        let txt_path = temp_dir.path().join("tracing.txt");
        std::fs::write(&txt_path, YAML)?;
        assert!(matches!(
            TracingConfig::load_from(&txt_path),
            Err(Error::UnsupportedFormat(_))
        ));
        Ok(())
    }
}
