//! Tracer configuration documents for tests.

use std::path::Path;

/// Tracing config selecting the dynamic OpenTracing factory
///
/// The plugin is told to write its spans to `output_file`.
pub fn dynamic_ot_yaml(library: &str, output_file: &Path) -> String {
    format!(
        r#"
http:
  name: envoy.tracers.dynamic_ot
  typed_config:
    "@type": type.googleapis.com/envoy.config.trace.v3.DynamicOtConfig
    library: {}
    config:
      output_file: {}
"#,
        yaml_string(library),
        yaml_string(&output_file.display().to_string())
    )
}

/// Same as [`dynamic_ot_yaml`] but registered under `name`
pub fn dynamic_ot_yaml_named(name: &str, library: &str, output_file: &Path) -> String {
    dynamic_ot_yaml(library, output_file).replacen("envoy.tracers.dynamic_ot", name, 1)
}

// Double-quoted scalar; paths on some platforms contain `:` or `\`.
fn yaml_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
