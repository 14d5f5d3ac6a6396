// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for envgroups.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. envgroups.toml (cwd, optional)
//! 3. --ini FILE (repeatable)
//! 4. ENVGROUPS_* env vars
//! 5. CLI overrides (--settings, --log-level, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! ENVGROUPS_STORE__PATH=/etc/app.json          → store.path
//! ENVGROUPS_PERSISTENCE__RETRY_ATTEMPTS=5      → persistence.retry_attempts
//! ENVGROUPS_GLOBAL__OUTPUT_LOG_LEVEL=4         → global.output_log_level
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{GlobalConfig, PersistenceConfig, StoreConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Settings document location.
    pub store: StoreConfig,
    /// Save retry behavior.
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use envgroups::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("envgroups.toml")
    ///     .with_env_prefix("ENVGROUPS")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate value ranges and required keys.
    ///
    /// # Errors
    ///
    /// Returns an error if `store.path` is empty or a persistence value is out
    /// of range.
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey {
                section: "store".to_string(),
                key: "path".to_string(),
            }
            .into());
        }
        self.persistence.validate()?;
        Ok(())
    }

    /// Format configuration options for display, ordered by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        options.insert(
            "global.output_log_level",
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level",
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file",
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("store.path", self.store.path.display().to_string());
        options.insert(
            "persistence.retry_attempts",
            self.persistence.retry_attempts.to_string(),
        );
        options.insert(
            "persistence.retry_backoff_ms",
            self.persistence.retry_backoff_ms.to_string(),
        );

        let max_key_len = options.keys().map(|k| k.len()).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}
