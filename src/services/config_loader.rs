use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::models::PROBLEM_LETTER_LIMIT;

pub const CONFIG_ENV_VAR: &str = "FROSTBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "frostboard.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_file_enabled")]
    pub file_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            level: default_log_level(),
            file_enabled: default_file_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrostboardConfig {
    /// Submission status counted as a solve. Every other status is a rejection.
    #[serde(default = "default_accepted_status")]
    pub accepted_status: String,
    /// Upper bound accepted by the start command.
    #[serde(default = "default_max_problems")]
    pub max_problems: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FrostboardConfig {
    fn default() -> Self {
        Self {
            accepted_status: default_accepted_status(),
            max_problems: default_max_problems(),
            logging: LoggingConfig::default(),
        }
    }
}

impl FrostboardConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.accepted_status.trim().is_empty(),
            "accepted_status must not be empty"
        );
        ensure!(
            (1..=PROBLEM_LETTER_LIMIT).contains(&self.max_problems),
            "max_problems must be between 1 and {}, got {}",
            PROBLEM_LETTER_LIMIT,
            self.max_problems
        );
        Ok(())
    }
}

fn default_accepted_status() -> String {
    "Accepted".to_string()
}

fn default_max_problems() -> usize {
    PROBLEM_LETTER_LIMIT
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_file_name() -> String {
    "frostboard.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_enabled() -> bool {
    true
}

/// `$FROSTBOARD_CONFIG`, or `frostboard.toml` in the working directory.
pub fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Reads and validates the config file. `Ok(None)` when the file does not exist.
pub fn load_frostboard_config(config_path: &Path) -> Result<Option<FrostboardConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config at {}", config_path.display()))?;

    let config = toml::from_str::<FrostboardConfig>(&raw)
        .with_context(|| format!("Failed to parse config at {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config at {}", config_path.display()))?;

    Ok(Some(config))
}
