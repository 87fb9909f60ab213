//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HOTPACK_*)
//! 2. TOML config file (if HOTPACK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HOTPACK_*)
/// 2. TOML config file (if HOTPACK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite store.
    ///
    /// Set via HOTPACK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL that store keys and fetch lookup keys are resolved against.
    ///
    /// Set via HOTPACK_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on the one-time startup bundle load, in milliseconds.
    /// A stuck read degrades to an empty cache instead of delaying the
    /// first response indefinitely.
    ///
    /// Set via HOTPACK_STARTUP_LOAD_TIMEOUT_MS environment variable.
    #[serde(default = "default_startup_load_timeout_ms")]
    pub startup_load_timeout_ms: u64,

    /// Capacity of the cross-tab update broadcast channel.
    ///
    /// Set via HOTPACK_BROADCAST_CAPACITY environment variable.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./hotpack-cache.sqlite")
}

fn default_base_url() -> String {
    "https://cdn.local/".into()
}

fn default_startup_load_timeout_ms() -> u64 {
    10_000
}

fn default_broadcast_capacity() -> usize {
    16
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            base_url: default_base_url(),
            startup_load_timeout_ms: default_startup_load_timeout_ms(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl AppConfig {
    /// Startup load bound as a Duration for use with tokio.
    pub fn startup_load_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_load_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HOTPACK_`
    /// 2. TOML file from `HOTPACK_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HOTPACK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HOTPACK_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./hotpack-cache.sqlite"));
        assert_eq!(config.base_url, "https://cdn.local/");
        assert_eq!(config.startup_load_timeout_ms, 10_000);
        assert_eq!(config.broadcast_capacity, 16);
    }

    #[test]
    fn test_startup_load_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.startup_load_timeout(), Duration::from_millis(10_000));
    }
}
