//! TOML configuration for Portal.
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. Explicit overrides (command-line flags)
//! 2. Environment variables (`PORTAL_API_URL`)
//! 3. `$PORTAL_HOME/config.toml`
//! 4. Built-in defaults
//!
//! ```toml
//! api_base_url = "http://localhost:2003/api"
//! locale = "vi"
//! request_timeout_secs = 30
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::dirs::AppDirs;

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:2003/api";

/// Locale tag used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "vi";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "PORTAL_API_URL";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse TOML in '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Raw contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub locale: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Effective configuration after all layers are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the authentication API, without trailing slash.
    pub api_base_url: String,
    /// Locale tag for user-facing messages.
    pub locale: String,
    /// Optional HTTP request timeout. `None` waits on the transport.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from the home directory and the process environment.
    pub fn load(dirs: &AppDirs) -> ConfigResult<Self> {
        let file = ConfigFile::read(&dirs.config_file())?;
        let mut config = Self::from_file(file)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Build configuration from a parsed file, filling in defaults.
    pub fn from_file(file: ConfigFile) -> ConfigResult<Self> {
        let mut config = Self::default();
        if let Some(url) = file.api_base_url {
            config.set_api_base_url("api_base_url", &url)?;
        }
        if let Some(locale) = file.locale {
            config.locale = locale.trim().to_lowercase();
        }
        if let Some(secs) = file.request_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "request_timeout_secs".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(url = %url, "Using API base URL from environment");
            self.set_api_base_url(API_URL_ENV_VAR, &url)?;
        }
        Ok(())
    }

    /// Override the API base URL (e.g. from a command-line flag).
    pub fn with_api_base_url(mut self, url: Option<&str>) -> ConfigResult<Self> {
        if let Some(url) = url {
            self.set_api_base_url("--api-url", url)?;
        }
        Ok(self)
    }

    /// Override the locale tag.
    pub fn with_locale(mut self, locale: Option<&str>) -> Self {
        if let Some(locale) = locale {
            self.locale = locale.trim().to_lowercase();
        }
        self
    }

    fn set_api_base_url(&mut self, key: &str, url: &str) -> ConfigResult<()> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{url}' is not an http(s) URL"),
            });
        }
        self.api_base_url = trimmed.to_string();
        Ok(())
    }
}

impl ConfigFile {
    /// Read and parse a config file. A missing file yields defaults.
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = Config::from_file(
            ConfigFile::read(&tmp.path().join("config.toml")).expect("read"),
        )
        .expect("config");
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "http://localhost:2003/api");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_file_values_applied() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://auth.example.com/api/\"\nlocale = \"EN\"\nrequest_timeout_secs = 15\n",
        )
        .expect("write");

        let config = Config::from_file(ConfigFile::read(&path).expect("read")).expect("config");
        assert_eq!(config.api_base_url, "https://auth.example.com/api");
        assert_eq!(config.locale, "en");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [").expect("write");
        assert!(matches!(
            ConfigFile::read(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "base = \"x\"").expect("write");
        assert!(ConfigFile::read(&path).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let file = ConfigFile {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            Config::from_file(file),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_precedence_flag_over_env_over_file() {
        let file = ConfigFile {
            api_base_url: Some("http://file.local/api".to_string()),
            ..Default::default()
        };
        let mut config = Config::from_file(file).expect("config");
        assert_eq!(config.api_base_url, "http://file.local/api");

        config
            .apply_env(|key| (key == API_URL_ENV_VAR).then(|| "http://env.local/api".to_string()))
            .expect("env");
        assert_eq!(config.api_base_url, "http://env.local/api");

        let config = config
            .with_api_base_url(Some("http://flag.local/api"))
            .expect("flag");
        assert_eq!(config.api_base_url, "http://flag.local/api");
    }

    #[test]
    fn test_empty_env_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some(String::new())).expect("env");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_non_http_url_rejected() {
        let result = Config::default().with_api_base_url(Some("localhost:2003"));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
