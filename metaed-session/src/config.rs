//! Configuration resolution for the session client
//!
//! Resolves the engine URL, notification timings and read-only denylist from
//! command line → environment → TOML → compiled defaults.

use metaed_common::config::{resolve_setting, TomlConfig};
use metaed_common::FieldMutabilityPolicy;
use std::time::Duration;

use crate::models::notification::{NotificationTimings, DEFAULT_ERROR_TTL, DEFAULT_INFO_TTL};

/// Default engine location
pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:5050";

/// Environment variable overriding the engine location
pub const ENGINE_URL_ENV: &str = "METAED_ENGINE_URL";

/// Resolved client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub engine_url: String,
    pub timings: NotificationTimings,
    pub policy: FieldMutabilityPolicy,
}

impl ClientConfig {
    pub fn resolve(cli_engine_url: Option<String>, toml: &TomlConfig) -> Self {
        let engine_url = resolve_setting(
            cli_engine_url,
            ENGINE_URL_ENV,
            toml.client.engine_url.clone(),
            DEFAULT_ENGINE_URL.to_string(),
        );

        let timings = NotificationTimings {
            error: toml
                .client
                .error_notification_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_ERROR_TTL),
            info: toml
                .client
                .notification_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INFO_TTL),
        };

        let policy = FieldMutabilityPolicy::standard()
            .with_additional(toml.client.read_only_fields.iter().cloned());

        Self {
            engine_url,
            timings,
            policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaed_common::config::ClientSection;

    #[test]
    fn test_cli_url_wins() {
        let config = ClientConfig::resolve(Some("http://cli:1".to_string()), &TomlConfig::default());
        assert_eq!(config.engine_url, "http://cli:1");
    }

    #[test]
    fn test_toml_section_applied() {
        let toml = TomlConfig {
            client: ClientSection {
                engine_url: None,
                error_notification_seconds: Some(12),
                notification_seconds: Some(3),
                read_only_fields: vec!["Software".to_string()],
            },
            ..Default::default()
        };

        let config = ClientConfig::resolve(Some(DEFAULT_ENGINE_URL.to_string()), &toml);
        assert_eq!(config.timings.error, Duration::from_secs(12));
        assert_eq!(config.timings.info, Duration::from_secs(3));
        assert!(config.policy.is_read_only("Software"));
        assert!(config.policy.is_read_only("ImageWidth"));
    }

    #[test]
    fn test_default_timings() {
        let config = ClientConfig::resolve(Some(DEFAULT_ENGINE_URL.to_string()), &TomlConfig::default());
        assert_eq!(config.timings, NotificationTimings::default());
    }
}
