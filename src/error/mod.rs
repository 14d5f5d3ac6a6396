// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!          EnvGroupsError (16 bytes)
//!                  |
//!        +---------+---------+
//!        |         |         |
//!        v         v         v
//!      Store     Config   Manager
//!       Box       Box       Box
//!
//! Sub-errors (unboxed internally):
//!   Store   Read, Write, Parse, Serialize, NotAnObject, Unavailable
//!   Config  ParseError, MissingKey, InvalidValue
//!   Manager NotReady, UnknownGroup
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`EnvGroupsError`].
pub type EnvGroupsResult<T> = std::result::Result<T, EnvGroupsError>;

/// Result type returned by settings stores.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum small on the stack.
#[derive(Debug, Error)]
pub enum EnvGroupsError {
    /// Settings store operation failed.
    #[error("store error: {0}")]
    Store(#[from] Box<StoreError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Group manager error.
    #[error("manager error: {0}")]
    Manager(#[from] Box<ManagerError>),
}

macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for EnvGroupsError {
                fn from(err: $error) -> Self {
                    EnvGroupsError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    StoreError => Store,
    ConfigError => Config,
    ManagerError => Manager,
}

// --- Store Errors ---

/// Settings store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the settings document.
    #[error("failed to read settings '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the settings document.
    #[error("failed to write settings '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings document is not valid JSON.
    #[error("failed to parse settings '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Settings document could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Settings document root is valid JSON but not an object.
    #[error("settings '{}' must contain a JSON object, found {found}", path.display())]
    NotAnObject { path: PathBuf, found: &'static str },

    /// Store is temporarily unable to serve the request.
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration sources could not be read or deserialized.
    #[error("failed to load config from {path}: {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Manager Errors ---

/// Environment group manager errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// Settings have not been loaded (yet, or the last load failed).
    #[error("environment groups are not loaded")]
    NotReady,

    /// Group id does not exist in the loaded collection.
    #[error("environment group '{0}' not found")]
    UnknownGroup(String),
}
