//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a small TOML file. Every key is
//! optional; a missing file means compiled defaults.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CDM_CONFIG`)
//! 3. Platform config directory (`<config_dir>/cdm-metadata/config.toml`)
//! 4. Compiled defaults (no file)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CDM_CONFIG";

/// Separator used when a multi-valued field is rendered as one string
pub const DEFAULT_SEPARATOR: &str = "; ";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Join engine settings (optional)
    #[serde(default)]
    pub join: JoinSettings,

    /// Directory searched for export files given by name only (optional)
    #[serde(default)]
    pub search_root: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings consumed by the metadata join engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinSettings {
    /// Separator placed between the values of a multi-valued field,
    /// both for object-level lookups and for flattened page records
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Resolve every page pointer against the tabular export while the
    /// engine is built, instead of failing lazily during iteration
    #[serde(default)]
    pub strict_page_pointers: bool,
}

impl Default for JoinSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            strict_page_pointers: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl TomlConfig {
    /// Parse a config file
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the file does not exist and
    /// `Error::Config` if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Loaded TOML configuration");
        Ok(config)
    }

    /// Resolve and load the config file, falling back to defaults
    ///
    /// A missing file is not fatal: a warning is logged and compiled
    /// defaults are returned. A file that exists but does not parse is
    /// still an error.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match ConfigResolver::new(CONFIG_ENV_VAR).resolve(cli_arg) {
            Some(path) if path.exists() => {
                info!("Configuration: {}", path.display());
                Self::load(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

/// Locates the config file following the priority order above
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    env_var_name: String,
}

impl ConfigResolver {
    pub fn new(env_var_name: impl Into<String>) -> Self {
        Self {
            env_var_name: env_var_name.into(),
        }
    }

    /// Returns the config file path to use, or `None` for compiled defaults
    ///
    /// Explicit paths (CLI, environment) are returned even when they do
    /// not exist so the caller can warn about them. The platform path is
    /// only returned when present.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|p| p.exists())
    }
}

/// Platform config file location (`~/.config/cdm-metadata/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cdm-metadata").join("config.toml"))
}
