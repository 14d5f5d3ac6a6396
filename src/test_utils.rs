// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! Log capture for asserting on emitted events, a settings store with
//! switchable failures, and a store whose saves wait for a release.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::{Notify, Semaphore};
use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{StoreError, StoreResult};
use crate::store::{MemoryStore, Settings, SettingsStore};

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Captured log output for the current thread.
///
/// Capture stops when this is dropped. Tasks spawned on a current-thread
/// runtime are captured too.
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl LogCapture {
    pub(crate) fn start() -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_writer(BufferMakeWriter {
                buffer: buffer.clone(),
            })
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_target(false)
            .finish();

        Self {
            buffer,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub(crate) fn output(&self) -> String {
        self.buffer
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).to_string())
            .unwrap_or_default()
    }
}

/// Memory-backed store whose loads and saves can be made to fail.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    fail_load: AtomicBool,
    failing_saves: AtomicUsize,
    save_attempts: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            inner: MemoryStore::new(settings),
            ..Self::default()
        }
    }

    pub(crate) fn fail_loads(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `count` saves fail.
    pub(crate) fn fail_next_saves(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    pub(crate) fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl SettingsStore for FlakyStore {
    fn load(&self) -> BoxFuture<'_, StoreResult<Settings>> {
        Box::pin(async move {
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("load refused".to_string()));
            }
            self.inner.load().await
        })
    }

    fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            self.save_attempts.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failing_saves
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(StoreError::Unavailable("save refused".to_string()));
            }
            self.inner.save(settings).await
        })
    }
}

/// Memory-backed store whose saves block until released.
///
/// Each save signals `save_started` and then waits for one permit from
/// [`GatedStore::release`].
#[derive(Debug)]
pub(crate) struct GatedStore {
    inner: MemoryStore,
    save_started: Notify,
    gate: Semaphore,
    saved_ids: Mutex<Vec<String>>,
}

impl GatedStore {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            inner: MemoryStore::new(settings),
            save_started: Notify::new(),
            gate: Semaphore::new(0),
            saved_ids: Mutex::new(Vec::new()),
        }
    }

    /// Waits until a save has reached the gate.
    pub(crate) async fn wait_for_save(&self) {
        self.save_started.notified().await;
    }

    /// Lets `count` saves through.
    pub(crate) fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// `activeEnvGroup` of each completed save, in order.
    pub(crate) fn saved_ids(&self) -> Vec<String> {
        self.saved_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl SettingsStore for GatedStore {
    fn load(&self) -> BoxFuture<'_, StoreResult<Settings>> {
        self.inner.load()
    }

    fn save<'a>(&'a self, settings: &'a Settings) -> BoxFuture<'a, StoreResult<()>> {
        Box::pin(async move {
            self.save_started.notify_one();
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| StoreError::Unavailable("gate closed".to_string()))?;
            permit.forget();

            self.inner.save(settings).await?;
            if let Ok(mut ids) = self.saved_ids.lock() {
                ids.push(settings.active_env_group().unwrap_or_default().to_string());
            }
            Ok(())
        })
    }
}
