// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings persistence.
//!
//! # Architecture
//!
//! ```text
//! SettingsStore (trait, BoxFuture methods)
//!   load() --> Settings      save(&Settings)
//!      |                          |
//!      +-- JsonFileStore   (JSON file, atomic replace)
//!      +-- MemoryStore     (in-process document)
//!
//! Settings: opaque JSON object
//!   env             legacy flat map, mirrored from the active group
//!   envGroups       { id: { name, variables } }
//!   activeEnvGroup  id
//!   ...             any other fields, preserved on save
//! ```

pub mod file;
pub mod memory;
pub mod settings;


use futures_util::future::BoxFuture;

use crate::error::StoreResult;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use settings::Settings;

/// Asynchronous persistence for the settings document.
///
/// The document is shared with other consumers, so implementations must store
/// exactly what they are given and return it unchanged from `load`.
///
/// Methods return `BoxFuture` so stores can be used as `Arc<dyn SettingsStore>`.
///
/// # Example
///
/// ```ignore
/// impl SettingsStore for MyStore {
///     fn load(&self) -> BoxFuture<'_, StoreResult<Settings>> {
///         Box::pin(self.read())
///     }
///     fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>> {
///         Box::pin(self.write(settings))
///     }
/// }
/// ```
pub trait SettingsStore: Send + Sync {
    /// Loads the current settings document.
    fn load(&self) -> BoxFuture<'_, StoreResult<Settings>>;

    /// Replaces the settings document.
    fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>>;

    /// Short human-readable location used in log messages.
    fn describe(&self) -> String {
        "settings store".to_string()
    }
}
