use anyhow::{Context, Result};
use dynot_plugin::{DlopenLoader, LibraryLoader};
use dynot_tracers::{LocalInfo, RuntimeFlags, ServerFactoryContext, TracerFactoryContext};
use dynot_types::ValidationMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "DYNOT_SETTINGS";

/// Resolve the settings file path based on priority:
/// 1. Explicit path
/// 2. DYNOT_SETTINGS environment variable
/// 3. Platform config directory (e.g. ~/.config/dynot/settings.toml)
pub fn resolve_settings_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os(SETTINGS_ENV) {
        return Ok(PathBuf::from(env_path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("dynot").join("settings.toml"))
        .context("Could not determine settings path: no platform config directory found")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub allow_deprecated_extension_names: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub node_id: String,
    pub validation: ValidationMode,
    pub runtime: RuntimeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            node_id: "dynot".to_string(),
            validation: ValidationMode::Strict,
            runtime: RuntimeSettings::default(),
        }
    }
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid settings {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn runtime_flags(&self) -> RuntimeFlags {
        RuntimeFlags {
            allow_deprecated_extension_names: self.runtime.allow_deprecated_extension_names,
        }
    }

    /// Factory context for these settings, loading libraries with dlopen
    pub fn factory_context(&self) -> TracerFactoryContext {
        self.factory_context_with_loader(Arc::new(DlopenLoader))
    }

    pub fn factory_context_with_loader(
        &self,
        loader: Arc<dyn LibraryLoader>,
    ) -> TracerFactoryContext {
        let server = ServerFactoryContext {
            local_info: LocalInfo {
                node_id: self.node_id.clone(),
            },
            runtime: self.runtime_flags(),
            loader,
        };
        TracerFactoryContext::new(server).with_validation(self.validation)
    }
}
