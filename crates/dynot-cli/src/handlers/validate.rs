use super::ok_marker;
use crate::config::Settings;
use crate::types::OutputFormat;
use anyhow::{Context, Result};
use dynot_tracers::{Error, registry, translate_to_factory_config};
use dynot_types::{TracingConfig, ValidationMode};
use std::path::Path;

pub fn handle(file: &Path, permissive: bool, settings: &Settings, format: OutputFormat) -> Result<()> {
    let config = TracingConfig::load_from(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let Some(http) = &config.http else {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "valid": true, "http": null }));
            }
            OutputFormat::Plain => {
                println!("{} {}", ok_marker("✓ Valid"), file.display());
                println!("  No HTTP tracer configured");
            }
        }
        return Ok(());
    };

    let mode = if permissive {
        ValidationMode::Permissive
    } else {
        settings.validation
    };

    let factory = registry::global()
        .get_factory_with_runtime(&http.name, &settings.runtime_flags())
        .ok_or_else(|| Error::UnknownFactory(http.name.clone()))?;
    let message = translate_to_factory_config(http, mode, factory.as_ref())
        .with_context(|| format!("Invalid tracer configuration in {}", file.display()))?;

    tracing::info!(factory = factory.name(), %mode, "configuration is valid");

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "http": {
                    "name": http.name,
                    "factory": factory.name(),
                    "config_type": message.type_name(),
                    "validation": mode.to_string(),
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{} {}", ok_marker("✓ Valid"), file.display());
            println!("  Factory:    {}", factory.name());
            println!("  Config:     {}", message.type_name());
            println!("  Validation: {}", mode);
        }
    }

    Ok(())
}
