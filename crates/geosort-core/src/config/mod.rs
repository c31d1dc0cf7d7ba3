//! Configuration management for geosort.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. It is read once at startup and handed to each component by
//! value; nothing reads it ambiently afterwards.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for geosort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory listing settings
    pub discovery: DiscoveryConfig,

    /// Coordinate extraction settings
    pub extraction: ExtractionConfig,

    /// Reverse geocoding settings
    pub geocoding: GeocodingConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Reorganization settings
    pub organize: OrganizeConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.geosort.geosort/config.toml
    /// - Linux: ~/.config/geosort/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\geosort\config\config.toml
    ///
    /// Falls back to ~/.geosort/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "geosort", "geosort")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".geosort").join("config.toml")
            })
    }

    /// Resolve where locality folders go for a given source directory.
    ///
    /// A configured destination has `~` expanded; otherwise the source
    /// directory itself is used.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        match &self.organize.destination {
            Some(dest) => {
                let path_str = dest.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&path_str).into_owned())
            }
            None => source.to_path_buf(),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
