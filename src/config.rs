//! Configuration module for partsum.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.partsum/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the command layer)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PARTSUM_` and use double
//! underscores to separate nested levels:
//! - `PARTSUM_WORKERS__COUNT=8` sets `workers.count`
//! - `PARTSUM_REDUCE__STRATEGY=shm` sets `reduce.strategy`
//! - `PARTSUM_LOGGING__DEFAULT=debug` sets `logging.default`

use crate::reduce::Strategy;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding the settings file, searched from the cwd upwards.
pub const CONFIG_DIR: &str = ".partsum";
pub const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "PARTSUM_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory containing `.partsum`, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Worker count defaults
    #[serde(default)]
    pub workers: WorkersConfig,

    /// Strategy and channel settings
    #[serde(default)]
    pub reduce: ReduceSettings,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkersConfig {
    /// Worker count used when the command line omits it
    #[serde(default = "default_worker_count")]
    pub count: usize,

    /// Lower the worker count to half the input length when it exceeds it
    #[serde(default)]
    pub clamp_to_half_input: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReduceSettings {
    /// Strategy used when the command line omits it
    #[serde(default)]
    pub strategy: Strategy,

    /// Result channel capacity for the pipe strategy (0 = unbounded)
    #[serde(default)]
    pub channel_capacity: usize,

    /// Per-worker debug logging
    #[serde(default)]
    pub worker_tracing: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level applied to every target without an override
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `reduce = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            workers: WorkersConfig::default(),
            reduce: ReduceSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: default_worker_count(),
            clamp_to_half_input: false,
        }
    }
}

impl Default for ReduceSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Pipe,
            channel_capacity: 0,
            worker_tracing: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration file already exists at {0}. Use --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("Failed to write configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    /// Defaults, then the TOML file if present, then `PARTSUM_` variables.
    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Find the settings file by looking for a `.partsum` directory from the
    /// current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .partsum is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Check that a settings file exists and parses
    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'partsum init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file under `root`
    pub fn init_config_file(root: impl AsRef<Path>, force: bool) -> Result<PathBuf, SettingsError> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(SettingsError::AlreadyExists(config_path));
        }

        Settings::default().save(&config_path)?;
        tracing::debug!(target: "config", "wrote default settings to {}", config_path.display());

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.workers.count > 0);
        assert!(!settings.workers.clamp_to_half_input);
        assert_eq!(settings.reduce.strategy, Strategy::Pipe);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[workers]
count = 4
clamp_to_half_input = true

[reduce]
strategy = "shm"
worker_tracing = true

[logging]
default = "info"

[logging.modules]
reduce = "debug"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.workers.count, 4);
        assert!(settings.workers.clamp_to_half_input);
        assert_eq!(settings.reduce.strategy, Strategy::Shm);
        assert!(settings.reduce.worker_tracing);
        assert_eq!(settings.logging.default, "info");
        assert_eq!(settings.logging.modules["reduce"], "debug");
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.workers.count = 3;
        settings.reduce.strategy = Strategy::Shm;

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.workers.count, 3);
        assert_eq!(loaded.reduce.strategy, Strategy::Shm);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[workers]\ncount = 16\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();

        // Modified values
        assert_eq!(settings.workers.count, 16);

        // Default values should still be present
        assert_eq!(settings.version, 1);
        assert_eq!(settings.reduce.strategy, Strategy::Pipe);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_invalid_strategy_in_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[reduce]\nstrategy = \"socket\"\n").unwrap();

        assert!(Settings::load_from(&config_path).is_err());
    }

    #[test]
    fn test_layered_config() {
        figment::Jail::expect_with(|jail| {
            fs::create_dir_all(jail.directory().join(CONFIG_DIR)).map_err(|e| e.to_string())?;
            jail.create_file(
                ".partsum/settings.toml",
                r#"
[workers]
count = 8

[reduce]
strategy = "shm"
channel_capacity = 4
"#,
            )?;

            // Environment variable should override config file
            jail.set_env("PARTSUM_REDUCE__CHANNEL_CAPACITY", "32");

            let settings = Settings::load().map_err(|e| *e)?;

            assert_eq!(settings.reduce.channel_capacity, 32);
            assert_eq!(settings.workers.count, 8);
            // Config file value should be used when no env var
            assert_eq!(settings.reduce.strategy, Strategy::Shm);
            assert!(settings.workspace_root.is_some());

            Ok(())
        });
    }

    #[test]
    fn test_check_init_reports_corrupted_file() {
        figment::Jail::expect_with(|jail| {
            let err = Settings::check_init().unwrap_err();
            assert!(err.contains("No configuration file found"));

            fs::create_dir_all(jail.directory().join(CONFIG_DIR)).map_err(|e| e.to_string())?;
            jail.create_file(".partsum/settings.toml", "[workers]\ncount = \"many\"\n")?;
            let err = Settings::check_init().unwrap_err();
            assert!(err.contains("corrupted"));
            assert!(err.contains("partsum init --force"));

            jail.create_file(".partsum/settings.toml", "[workers]\ncount = 2\n")?;
            assert!(Settings::check_init().is_ok());

            Ok(())
        });
    }

    #[test]
    fn test_init_config_file_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();

        let path = Settings::init_config_file(temp_dir.path(), false).unwrap();
        assert!(path.exists());

        let err = Settings::init_config_file(temp_dir.path(), false).unwrap_err();
        assert!(matches!(err, SettingsError::AlreadyExists(_)));

        assert!(Settings::init_config_file(temp_dir.path(), true).is_ok());
    }
}
