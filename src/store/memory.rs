// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-process settings store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::BoxFuture;

use super::{Settings, SettingsStore};
use crate::error::{StoreError, StoreResult};

/// Settings store holding the document in memory.
///
/// Useful when the host application owns persistence itself, or for
/// embedding the manager without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Settings>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            document: Mutex::new(settings),
            loads: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    /// Returns a copy of the current document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the document lock is poisoned.
    pub fn snapshot(&self) -> StoreResult<Settings> {
        self.document
            .lock()
            .map(|doc| doc.clone())
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))
    }

    /// Replaces the document without counting as a save.
    ///
    /// Models another consumer writing the shared document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the document lock is poisoned.
    pub fn replace(&self, settings: Settings) -> StoreResult<()> {
        let mut doc = self
            .document
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        *doc = settings;
        Ok(())
    }

    /// Number of completed `load` calls.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of completed `save` calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> BoxFuture<'_, StoreResult<Settings>> {
        Box::pin(async move {
            let settings = self.snapshot()?;
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(settings)
        })
    }

    fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            self.replace(settings.clone())?;
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
