//! Common utilities shared across Portal crates.

pub mod config;
pub mod dirs;
pub mod http_client;

pub use config::{
    API_URL_ENV_VAR, Config, ConfigError, ConfigFile, ConfigResult, DEFAULT_API_BASE_URL,
    DEFAULT_LOCALE,
};
pub use dirs::{AppDirs, HOME_ENV_VAR};
pub use http_client::{USER_AGENT, create_client, create_client_builder};
