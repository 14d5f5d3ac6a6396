// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types.
//!
//! ```text
//! Config: GlobalConfig, StoreConfig, PersistenceConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::LogLevel;
use crate::manager::PersistPolicy;

/// Upper bound for `persistence.retry_attempts`.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console (stderr) output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::WARN,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Settings document location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Path of the JSON settings file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("settings.json"),
        }
    }
}

/// Retry behavior for saving selections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistenceConfig {
    /// Extra save attempts after a failure.
    pub retry_attempts: u32,
    /// Delay before the first retry, in milliseconds; doubled per retry.
    pub retry_backoff_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 2,
            retry_backoff_ms: 100,
        }
    }
}

impl PersistenceConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `retry_attempts` exceeds
    /// [`MAX_RETRY_ATTEMPTS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::InvalidValue {
                section: "persistence".to_string(),
                key: "retry_attempts".to_string(),
                message: format!(
                    "must be at most {MAX_RETRY_ATTEMPTS}, got {}",
                    self.retry_attempts
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_policy(&self) -> PersistPolicy {
        PersistPolicy::builder()
            .with_retry_attempts(self.retry_attempts)
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms))
            .build()
    }
}
