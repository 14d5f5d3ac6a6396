// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON file settings store.
//!
//! ```text
//! load:  read file --> parse JSON --> require object
//!        missing / blank file --> empty document
//! save:  pretty JSON --> NamedTempFile (same dir) --> copy target permissions
//!        --> fsync --> persist (rename)
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use super::settings::json_kind;
use super::{Settings, SettingsStore};
use crate::error::{StoreError, StoreResult};

/// Settings store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> StoreResult<Settings> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Settings file not found, using empty document");
                return Ok(Settings::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Settings::new());
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let found = json_kind(&value);
        Settings::from_value(value).ok_or_else(|| StoreError::NotAnObject {
            path: self.path.clone(),
            found,
        })
    }

    async fn write(&self, settings: &Settings) -> StoreResult<()> {
        let mut contents =
            serde_json::to_vec_pretty(settings.as_map()).map_err(StoreError::Serialize)?;
        contents.push(b'\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &contents))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))??;

        trace!(path = %self.path.display(), "Settings written");
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> BoxFuture<'_, StoreResult<Settings>> {
        Box::pin(self.read())
    }

    fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(self.write(settings))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes `contents` to a temp file next to `path`, then renames it over `path`.
///
/// Readers observe either the old or the new document, never a partial one.
/// An existing file keeps its permissions.
fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let write_err = |source: std::io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(contents).map_err(write_err)?;
    match std::fs::metadata(path) {
        Ok(meta) => temp
            .as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(write_err(e)),
    }
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
