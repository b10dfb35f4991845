use super::heading;
use crate::types::OutputFormat;
use anyhow::Result;
use dynot_tracers::registry;

pub fn handle(format: OutputFormat) -> Result<()> {
    let registry = registry::global();
    let factories: Vec<_> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get_factory(&name))
        .collect();
    let deprecated = registry.deprecated_names();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "factories": factories
                    .iter()
                    .map(|factory| serde_json::json!({
                        "name": factory.name(),
                        "config_type": factory.config_type(),
                    }))
                    .collect::<Vec<_>>(),
                "deprecated": deprecated
                    .iter()
                    .map(|(name, replacement)| serde_json::json!({
                        "name": name,
                        "replacement": replacement,
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{:<30} CONFIG TYPE", "FACTORY");
            for factory in &factories {
                println!("{:<30} {}", factory.name(), factory.config_type());
            }

            if !deprecated.is_empty() {
                println!();
                println!(
                    "{}",
                    heading("Deprecated names (need runtime.allow_deprecated_extension_names):")
                );
                for (name, replacement) in &deprecated {
                    println!("  {} -> {}", name, replacement);
                }
            }
        }
    }

    Ok(())
}
