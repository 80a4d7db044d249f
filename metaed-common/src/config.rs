//! Configuration loading and setting resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never aborts startup: a warning is logged
//! and the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Default log level when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "METAED_LOG_LEVEL";

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "METAED_CONFIG";

/// Contents of `config.toml`
///
/// All fields are optional so that partial files (or files written by an
/// older version) still parse.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Session client settings
    #[serde(default)]
    pub client: ClientSection,

    /// Metadata engine settings
    #[serde(default)]
    pub engine: EngineSection,
}

/// `[client]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClientSection {
    /// Base URL of the metadata engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_url: Option<String>,

    /// Seconds an error notification stays visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_notification_seconds: Option<u64>,

    /// Seconds a warning/success notification stays visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_seconds: Option<u64>,

    /// Extra field names treated as read-only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_only_fields: Vec<String>,
}

/// `[engine]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// exiftool executable (name on PATH or absolute path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exiftool_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exiftool_timeout_seconds: Option<u64>,

    /// Maximum accepted upload size in megabytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_mb: Option<u64>,
}

/// Platform config file location: `<config dir>/metaed/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("metaed").join("config.toml"))
}

/// Read and parse a TOML config file, failing on any error
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config file with graceful degradation
///
/// Lookup order: explicit `path`, then `METAED_CONFIG`, then the platform
/// default. A missing file silently yields defaults; an unreadable or
/// malformed one logs a warning and yields defaults.
pub fn load_toml_config(path: Option<&Path>) -> TomlConfig {
    let candidate = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .or_else(default_config_path);

    let Some(candidate) = candidate else {
        debug!("No config directory available, using defaults");
        return TomlConfig::default();
    };

    if !candidate.exists() {
        debug!("Config file {} not found, using defaults", candidate.display());
        return TomlConfig::default();
    }

    match read_toml_config(&candidate) {
        Ok(config) => {
            debug!("Loaded config from {}", candidate.display());
            config
        }
        Err(e) => {
            warn!("{}; continuing with defaults", e);
            TomlConfig::default()
        }
    }
}

/// Resolve one setting across the four tiers
///
/// An environment variable that is set but does not parse is ignored with a
/// warning rather than silently shadowing the TOML value.
///
/// # Examples
///
/// ```
/// use metaed_common::config::resolve_setting;
///
/// let port: u16 = resolve_setting(None, "METAED_DOC_EXAMPLE_PORT", Some(6000), 5050);
/// assert_eq!(port, 6000);
/// ```
pub fn resolve_setting<T>(cli: Option<T>, env_var: &str, toml: Option<T>, default: T) -> T
where
    T: FromStr,
{
    if let Some(value) = cli {
        return value;
    }

    if let Ok(raw) = std::env::var(env_var) {
        match raw.trim().parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!("Ignoring unparseable {}={:?}", env_var, raw),
        }
    }

    toml.unwrap_or(default)
}

/// Resolve the log level: environment → TOML → default
pub fn resolve_log_level(toml: &TomlConfig) -> String {
    resolve_setting(
        None,
        LOG_LEVEL_ENV,
        toml.log_level.clone(),
        DEFAULT_LOG_LEVEL.to_string(),
    )
}
