//! Configuration management for the class map registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (classmap.toml)
//! - Environment variables (CLASSMAP__*)
//!
//! ## Example config file (classmap.toml):
//! ```toml
//! [registry]
//! serialize_registration = false
//!
//! [export]
//! output_format = "pretty"
//! include_checksum = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration for the class map registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassMapConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Snapshot export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Reserve each class across configure-and-insert.
    ///
    /// A second registration of a reserved class waits and is then rejected
    /// before configuring. When false only the table insert is locked, so two
    /// threads registering the same class can both run their configuration
    /// callbacks before one of them is rejected as a duplicate.
    #[serde(default)]
    pub serialize_registration: bool,
}

/// Snapshot export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Attach a SHA256 fingerprint of the mapped classes
    #[serde(default = "default_true")]
    pub include_checksum: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            include_checksum: true,
        }
    }
}

impl ClassMapConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["classmap.toml", ".classmap.toml", "config/classmap.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "classmap") {
            let xdg_config = config_dir.config_dir().join("classmap.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (CLASSMAP__*)
        builder = builder.add_source(
            Environment::with_prefix("CLASSMAP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
