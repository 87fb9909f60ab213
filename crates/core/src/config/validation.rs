//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `base_url` is not an absolute URL that can serve as a join base
    /// - `startup_load_timeout_ms` is 0 or exceeds 5 minutes
    /// - `broadcast_capacity` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.base_url) {
            Err(e) => {
                return Err(ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() });
            }
            Ok(url) if url.cannot_be_a_base() => {
                return Err(ConfigError::Invalid {
                    field: "base_url".into(),
                    reason: "must be a base-capable absolute URL".into(),
                });
            }
            Ok(_) => {}
        }

        if self.startup_load_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "startup_load_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.startup_load_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "startup_load_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "broadcast_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }

        Ok(())
    }
}
