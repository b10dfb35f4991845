use super::ok_marker;
use crate::config::Settings;
use crate::types::OutputFormat;
use anyhow::Result;
use std::path::Path;

pub fn handle(path: &Path, settings: &Settings, init: bool, format: OutputFormat) -> Result<()> {
    let created = init && !path.exists();
    if created {
        settings.save_to(path)?;
        tracing::info!(path = %path.display(), "wrote default settings");
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "settings": settings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if created {
                println!("{} {}", ok_marker("✓ Created"), path.display());
            } else {
                println!("Settings: {}", path.display());
            }
            print!("{}", toml::to_string_pretty(settings)?);
        }
    }

    Ok(())
}
