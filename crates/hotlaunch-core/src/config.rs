//! Configuration management for hotlaunch.
//!
//! The configuration only holds application settings. The hotkeys themselves
//! live in the hotkey store, whose location can be overridden here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};

use crate::{APP_NAME, STORE_FILE_NAME};

/// Core configuration structure for the application.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Location of the hotkey store. Defaults to the per-user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Show desktop notifications for warnings and errors
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub notifications: bool,

    /// Show the tray icon
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub show_tray: bool,
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            notifications: true,
            show_tray: true,
        }
    }
}

impl Config {
    /// Whether the store path override is relative, and so depends on the
    /// working directory.
    pub fn has_relative_store_path(&self) -> bool {
        self.store_path.as_ref().is_some_and(|p| p.is_relative())
    }

    /// Returns the configured store path, or the default one.
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => default_store_path(),
        }
    }
}

/// Default location of the hotkey store using `dirs::data_dir`.
fn default_store_path() -> Result<PathBuf> {
    let data_dir = data_dir().context("Failed to retrieve data directory")?;
    Ok(data_dir.join(APP_NAME).join(STORE_FILE_NAME))
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new ConfigManager with the default configuration directory.
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Creates a new ConfigManager with a specified configuration directory.
    #[cfg(test)]
    pub fn with_config_dir<P: AsRef<Path>>(dir: P) -> Self {
        let config_path = dir.as_ref().join(format!("{}.toml", APP_NAME));
        Self { config_path }
    }

    /// Returns the default path to the configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to retrieve configuration directory")?;
        Ok(config_dir.join(APP_NAME).join(format!("{}.toml", APP_NAME)))
    }

    /// Loads the configuration from the config file or returns default.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file at {:?}", self.config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file at {:?}", self.config_path))?;

        Ok(config)
    }

    /// Saves the configuration to the config file, only writing non-default fields.
    pub fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self
            .config_path
            .parent()
            .with_context(|| format!("Failed to get parent directory of {:?}", self.config_path))?;

        fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory at {:?}", config_dir))?;

        let serialized =
            toml::to_string_pretty(&config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, serialized)
            .with_context(|| format!("Failed to write config file at {:?}", self.config_path))?;

        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
