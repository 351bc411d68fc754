//! Bootstrap configuration loading
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `AAVA_CONFIG` environment variable
//! 3. User config directory (`~/.config/aava/config.toml` on Linux)
//! 4. System config (`/etc/aava/config.toml`, Linux only)
//! 5. Compiled defaults (fallback)
//!
//! A missing config file is not an error: callers get the compiled
//! defaults and a warning. A file that exists but does not parse is.

use crate::reference::ReferenceTable;
use crate::scoring::ConfidenceScale;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AAVA_CONFIG";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Confidence calibration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub scale: ConfidenceScale,
}

/// Reference data source for rule checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// TOML region table; the built-in sample is used when absent
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5760
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Origin of a loaded [`TomlConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Named explicitly but absent; compiled defaults in use
    Missing(PathBuf),
    /// No file found anywhere; compiled defaults in use
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::File(path) | ConfigSource::Missing(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }

    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigSource::File(_))
    }

    /// Report the origin at info, or warn for a missing file
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            ),
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

impl TomlConfig {
    /// Parse and validate a config document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config file and load it, falling back to defaults
    ///
    /// Logs where the configuration came from. Binaries that install their
    /// subscriber from the loaded config use [`TomlConfig::load_resolved`]
    /// and call [`ConfigSource::log`] once tracing is up.
    pub fn resolve_and_load(cli_arg: Option<&Path>) -> Result<Self> {
        let (config, source) = Self::load_resolved(resolve_config_path(cli_arg))?;
        source.log();
        Ok(config)
    }

    /// Load from an already resolved path without logging
    ///
    /// Only a missing file degrades to defaults; read or parse failures of a
    /// file that exists are returned.
    pub fn load_resolved(path: Option<PathBuf>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                let config = Self::load(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Check field values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.service.port == 0 {
            return Err(Error::Config("service.port must be non-zero".to_string()));
        }
        if self.service.host.trim().is_empty() {
            return Err(Error::Config("service.host must not be empty".to_string()));
        }
        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "logging.level '{}' is not one of {:?}",
                self.logging.level, VALID_LOG_LEVELS
            )));
        }
        Ok(())
    }

    /// Reference table named by the config, or the built-in sample
    pub fn load_reference_table(&self) -> Result<ReferenceTable> {
        match &self.reference.file {
            Some(path) => ReferenceTable::load(path),
            None => Ok(ReferenceTable::sample()),
        }
    }
}

/// Pick the config file path by priority
///
/// Explicit sources (CLI, environment) are returned even when the file does
/// not exist so the caller can report it; platform locations are only
/// returned when present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3/4: Platform locations
    default_config_locations().into_iter().find(|p| p.exists())
}

/// Platform config file locations, most specific first
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut locations: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("aava").join("config.toml"))
        .into_iter()
        .collect();

    if cfg!(target_os = "linux") {
        locations.push(PathBuf::from("/etc/aava/config.toml"));
    }

    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.service.host, "127.0.0.1");
        assert_eq!(config.service.port, 5760);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert_eq!(config.scoring.scale, ConfidenceScale::Weighted);
        assert!(config.reference.file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(TomlConfig::from_toml_str("").unwrap(), TomlConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = TomlConfig::from_toml_str(
            r#"
            [service]
            port = 8080

            [scoring]
            scale = "normalized"
            "#,
        )
        .unwrap();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.host, "127.0.0.1");
        assert_eq!(config.scoring.scale, ConfidenceScale::Normalized);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            TomlConfig::from_toml_str("[service]\nport = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TomlConfig::from_toml_str("[logging]\nlevel = \"loud\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TomlConfig::from_toml_str("[scoring]\nscale = \"exponential\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_cli_path_has_priority() {
        let path = PathBuf::from("/tmp/aava-cli-config.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }

    #[test]
    fn test_load_resolved_reports_source() {
        let (config, source) = TomlConfig::load_resolved(None).unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
        assert!(source.is_default());
        assert_eq!(source.path(), None);

        let missing = PathBuf::from("/nonexistent/aava/config.toml");
        let (config, source) = TomlConfig::load_resolved(Some(missing.clone())).unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(source, ConfigSource::Missing(missing.clone()));
        assert!(source.is_default());
        assert_eq!(source.path(), Some(missing.as_path()));
    }

    #[test]
    fn test_sample_reference_table_by_default() {
        let table = TomlConfig::default().load_reference_table().unwrap();
        assert_eq!(table, ReferenceTable::sample());
    }
}
