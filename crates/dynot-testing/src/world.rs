//! Isolated environment for running the `dynot` binary.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory with its own settings file and environment
///
/// # Example
/// ```no_run
/// use dynot_testing::TestWorld;
///
/// let world = TestWorld::new().with_settings("validation = \"permissive\"\n");
/// let result = world.run(&["factories"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    settings_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let settings_path = temp_dir.path().join("settings.toml");

        Self {
            temp_dir,
            settings_path,
            env_vars: HashMap::new(),
        }
    }

    /// Get the temp directory root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the settings file passed with `--settings`.
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Resolve `name` inside the temp directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write the settings file.
    pub fn with_settings(self, toml: &str) -> Self {
        std::fs::write(&self.settings_path, toml).expect("Failed to write settings");
        self
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `contents` to `name` inside the temp directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    /// Configure a CLI command with this environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--settings")
            .arg(&self.settings_path)
            .current_dir(self.temp_dir.path())
            .env_remove("RUST_LOG")
            .env_remove("DYNOT_SETTINGS");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `dynot` binary with `args` in this environment.
    ///
    /// # Note
    /// This method uses `Command::cargo_bin()`, which requires the binary to
    /// be built by the surrounding `cargo test` run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("dynot")
            .map_err(|e| anyhow::anyhow!("Failed to find dynot binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON (for `--format json` runs).
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}
