//! Init and Config commands.

use anyhow::Context;
use std::path::Path;

use crate::config::{Settings, SettingsError};
use crate::io::ExitCode;

/// Run init command - create configuration file under `root`.
pub fn run_init(root: &Path, force: bool) -> ExitCode {
    match Settings::init_config_file(root, force) {
        Ok(path) => {
            if force {
                println!("Wrote configuration file at: {}", path.display());
            } else {
                println!("Created configuration file at: {}", path.display());
            }
            println!("Edit this file to customize your settings.");
            ExitCode::Success
        }
        Err(e @ SettingsError::AlreadyExists(_)) => {
            eprintln!("{e}");
            ExitCode::ConfigError
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::GeneralError
        }
    }
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> ExitCode {
    match render_config(config) {
        Ok(toml_str) => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{toml_str}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error displaying config: {e:#}");
            ExitCode::GeneralError
        }
    }
}

fn render_config(config: &Settings) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("failed to serialize settings as TOML")
}
