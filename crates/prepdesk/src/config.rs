//! Client configuration.
//!
//! Loading order:
//! 1. Defaults ([`ClientConfig::default`])
//! 2. A TOML file, if one is given and exists
//! 3. `PREPDESK_*` environment variable overrides
//!
//! ```toml
//! api_base_url = "https://api.prepdesk.example"
//! request_timeout_secs = 10
//! storage_dir = "/home/me/.local/share/prepdesk"
//! stale_responses = "discard"
//! log_filter = "info,prepdesk_session=debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use prepdesk_session::{SessionConfig, StaleResponsePolicy};
use prepdesk_storage::FileStore;
use serde::{Deserialize, Serialize};

/// Overrides [`ClientConfig::api_base_url`].
pub const ENV_API_URL: &str = "PREPDESK_API_URL";
/// Overrides [`ClientConfig::storage_dir`].
pub const ENV_STORAGE_DIR: &str = "PREPDESK_STORAGE_DIR";
/// Overrides [`ClientConfig::log_filter`].
pub const ENV_LOG: &str = "PREPDESK_LOG";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything needed to build a [`SessionContext`](crate::SessionContext).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend API (auth endpoints live under `/auth`).
    pub api_base_url: String,

    /// Per-request timeout in seconds. Must be non-zero.
    pub request_timeout_secs: u64,

    /// Where session keys are persisted. `None` uses the platform data
    /// directory.
    pub storage_dir: Option<PathBuf>,

    pub identity_key: String,
    pub token_key: String,

    /// See [`StaleResponsePolicy`].
    pub stale_responses: StaleResponsePolicy,

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            storage_dir: None,
            identity_key: session.identity_key,
            token_key: session.token_key,
            stale_responses: session.stale_responses,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `path` (if given and present) and the
    /// process environment.
    ///
    /// Does NOT validate; call [`validate`](Self::validate) afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_toml(path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_toml(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies `PREPDESK_*` overrides, reading variables through `lookup`
    /// so tests don't have to mutate the process environment.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
    }

    /// Checks values that would otherwise fail later and less clearly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://")
            || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.identity_key == self.token_key {
            return Err(ConfigError::Invalid(
                "identity_key and token_key must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured storage directory, or the platform default.
    pub fn resolve_storage_dir(&self) -> Result<PathBuf, ConfigError> {
        self.storage_dir
            .clone()
            .or_else(FileStore::default_location)
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "no storage_dir configured and no platform data directory"
                        .into(),
                )
            })
    }

    /// The session-layer slice of this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            identity_key: self.identity_key.clone(),
            token_key: self.token_key.clone(),
            stale_responses: self.stale_responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();

        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.identity_key, "user");
        assert_eq!(config.token_key, "token");
        assert_eq!(config.stale_responses, StaleResponsePolicy::Apply);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_partial_document_keeps_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            api_base_url = "https://api.example.com"
            stale_responses = "discard"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.stale_responses, StaleResponsePolicy::Discard);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.token_key, "token");
    }

    #[test]
    fn test_from_toml_str_unknown_policy_is_error() {
        assert!(ClientConfig::from_toml_str(r#"stale_responses = "queue""#).is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://staging.example.com"),
            (ENV_STORAGE_DIR, "/tmp/prepdesk-test"),
        ]
        .into_iter()
        .collect();
        let mut config = ClientConfig::default();

        config.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://staging.example.com");
        assert_eq!(
            config.storage_dir.as_deref(),
            Some(Path::new("/tmp/prepdesk-test"))
        );
        assert_eq!(config.log_filter, "info", "unset variables change nothing");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ClientConfig {
            api_base_url: "ftp://nope".into(),
            ..ClientConfig::default()
        };
        let zero_timeout = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        let same_keys = ClientConfig {
            token_key: "user".into(),
            ..ClientConfig::default()
        };

        for config in [bad_url, zero_timeout, same_keys] {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_session_config_mirrors_keys() {
        let config = ClientConfig {
            identity_key: "prepdesk.user".into(),
            token_key: "prepdesk.token".into(),
            ..ClientConfig::default()
        };

        let session = config.session_config();

        assert_eq!(session.identity_key, "prepdesk.user");
        assert_eq!(session.token_key, "prepdesk.token");
    }

    #[test]
    fn test_resolve_storage_dir_prefers_explicit() {
        let config = ClientConfig {
            storage_dir: Some(PathBuf::from("/data/prepdesk")),
            ..ClientConfig::default()
        };

        assert_eq!(
            config.resolve_storage_dir().unwrap(),
            PathBuf::from("/data/prepdesk")
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        let config =
            ClientConfig::load(Some(&tmp.path().join("absent.toml"))).unwrap();

        // Env overrides may apply in CI, so only check a field they don't touch.
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_malformed_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();

        let err = ClientConfig::load(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::Toml { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
