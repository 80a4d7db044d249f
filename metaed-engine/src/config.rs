//! Engine configuration
//!
//! Resolves listen address, exiftool location and limits from
//! command line → environment → TOML → compiled defaults.

use metaed_common::config::{resolve_setting, TomlConfig};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_EXIFTOOL: &str = "exiftool";
pub const DEFAULT_EXIFTOOL_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

pub const HOST_ENV: &str = "METAED_HOST";
pub const PORT_ENV: &str = "METAED_PORT";
pub const EXIFTOOL_ENV: &str = "METAED_EXIFTOOL";
pub const EXIFTOOL_TIMEOUT_ENV: &str = "METAED_EXIFTOOL_TIMEOUT_SECONDS";
pub const MAX_FILE_SIZE_ENV: &str = "METAED_MAX_FILE_SIZE_MB";

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct EngineOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub exiftool: Option<String>,
}

/// Resolved engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    pub exiftool_path: String,
    pub exiftool_timeout: Duration,
    pub max_file_size_mb: u64,
}

impl EngineConfig {
    pub fn resolve(overrides: EngineOverrides, toml: &TomlConfig) -> Self {
        let engine = &toml.engine;
        Self {
            host: resolve_setting(
                overrides.host,
                HOST_ENV,
                engine.host.clone(),
                DEFAULT_HOST.to_string(),
            ),
            port: resolve_setting(overrides.port, PORT_ENV, engine.port, DEFAULT_PORT),
            exiftool_path: resolve_setting(
                overrides.exiftool,
                EXIFTOOL_ENV,
                engine.exiftool_path.clone(),
                DEFAULT_EXIFTOOL.to_string(),
            ),
            exiftool_timeout: Duration::from_secs(resolve_setting(
                None,
                EXIFTOOL_TIMEOUT_ENV,
                engine.exiftool_timeout_seconds,
                DEFAULT_EXIFTOOL_TIMEOUT_SECONDS,
            )),
            max_file_size_mb: resolve_setting(
                None,
                MAX_FILE_SIZE_ENV,
                engine.max_file_size_mb,
                DEFAULT_MAX_FILE_SIZE_MB,
            ),
        }
    }

    /// Upload limit in bytes
    pub fn max_body_bytes(&self) -> usize {
        (self.max_file_size_mb as usize).saturating_mul(1024 * 1024)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            exiftool_path: DEFAULT_EXIFTOOL.to_string(),
            exiftool_timeout: Duration::from_secs(DEFAULT_EXIFTOOL_TIMEOUT_SECONDS),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaed_common::config::EngineSection;

    #[test]
    fn test_overrides_beat_toml() {
        let toml = TomlConfig {
            engine: EngineSection {
                port: Some(7000),
                exiftool_path: Some("/opt/exiftool".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = EngineConfig::resolve(
            EngineOverrides {
                port: Some(8123),
                ..Default::default()
            },
            &toml,
        );
        assert_eq!(config.port, 8123);
        assert_eq!(config.exiftool_path, "/opt/exiftool");
    }

    #[test]
    fn test_toml_limits() {
        let toml = TomlConfig {
            engine: EngineSection {
                exiftool_timeout_seconds: Some(3),
                max_file_size_mb: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = EngineConfig::resolve(EngineOverrides::default(), &toml);
        assert_eq!(config.exiftool_timeout, Duration::from_secs(3));
        assert_eq!(config.max_body_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5050");
        assert_eq!(config.max_body_bytes(), 50 * 1024 * 1024);
    }
}
