//! Bootstrap configuration loading
//!
//! Resolution order for every bootstrap value:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in default (fallback)
//!
//! A missing config file is not an error: defaults are used and a warning is logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NEXX_CONFIG";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "NEXX_DATABASE_PATH";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Enrichment engine defaults (optional)
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
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

/// Enrichment run defaults
///
/// Every field has a built-in default so a partial `[enrichment]` table is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Preview only; no store writes
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Change budget shared by all passes of one run
    #[serde(default = "default_max_changes")]
    pub max_changes_per_run: usize,

    /// Devices sampled by the cross-reference pass
    #[serde(default = "default_cross_reference_sample")]
    pub cross_reference_sample: u32,

    /// Devices sampled by the gap-fill pass
    #[serde(default = "default_gap_fill_sample")]
    pub gap_fill_sample: u32,

    /// Devices sampled by each data-quality sub-sweep
    #[serde(default = "default_quality_sample")]
    pub quality_sample: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            max_changes_per_run: default_max_changes(),
            cross_reference_sample: default_cross_reference_sample(),
            gap_fill_sample: default_gap_fill_sample(),
            quality_sample: default_quality_sample(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dry_run() -> bool {
    true
}

fn default_max_changes() -> usize {
    25
}

fn default_cross_reference_sample() -> u32 {
    100
}

fn default_gap_fill_sample() -> u32 {
    50
}

fn default_quality_sample() -> u32 {
    20
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load a TOML file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration following the resolution order, falling back to defaults
    ///
    /// An explicitly named file (CLI or ENV) that fails to load is an error;
    /// a missing default-location file is not.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let source = ConfigSource::locate(cli_path);
        source.log();
        Self::from_source(&source)
    }

    /// Load from an already located source without logging
    ///
    /// Lets a binary read `[logging]` before its subscriber exists and call
    /// `ConfigSource::log` afterwards.
    pub fn from_source(source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::CommandLine(path)
            | ConfigSource::Environment(path)
            | ConfigSource::DefaultFile(path) => Self::load(path),
            ConfigSource::BuiltIn => Ok(Self::default()),
        }
    }

    /// Resolve the database path: CLI → ENV → TOML → OS default
    pub fn database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.database_path {
            return path.clone();
        }

        default_database_path()
    }
}

/// Where the bootstrap configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    DefaultFile(PathBuf),
    /// No file anywhere; built-in defaults
    BuiltIn,
}

impl ConfigSource {
    /// Apply the resolution order; touches the filesystem but never logs
    pub fn locate(cli_path: Option<&Path>) -> Self {
        if let Some(path) = cli_path {
            return ConfigSource::CommandLine(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return ConfigSource::Environment(PathBuf::from(path));
        }

        match default_config_file() {
            Some(path) => ConfigSource::DefaultFile(path),
            None => ConfigSource::BuiltIn,
        }
    }

    pub fn log(&self) {
        match self {
            ConfigSource::CommandLine(path) => {
                info!("Loading config from command line: {}", path.display())
            }
            ConfigSource::Environment(path) => {
                info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display())
            }
            ConfigSource::DefaultFile(path) => info!("Loading config from {}", path.display()),
            ConfigSource::BuiltIn => warn!("No config file found, using built-in defaults"),
        }
    }
}

/// First existing config file in the platform search path
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("nexx").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/nexx/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nexx"))
        .unwrap_or_else(|| PathBuf::from("./nexx_data"))
        .join("nexx.db")
}
