// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Serialized persistence of selection changes.
//!
//! ```text
//! select_group --> flume queue --> worker (one per manager)
//!                                   |
//!                     drain queue, keep newest request
//!                                   |
//!                     load --> apply_selection --> save
//!                       (retry with backoff, newer request wins)
//!                                   |
//!                     record error, publish completed generation
//! ```
//!
//! Only one save is in flight per manager, so an older selection can never
//! overwrite a newer one in the store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bon::Builder;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::store::SettingsStore;

/// Retry behavior for persisting a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct PersistPolicy {
    /// Extra attempts after the first failure.
    #[builder(setters(name = with_retry_attempts), default = 2)]
    retry_attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    #[builder(setters(name = with_retry_backoff), default = Duration::from_millis(100))]
    retry_backoff: Duration,
}

impl Default for PersistPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PersistPolicy {
    /// Policy that tries each save exactly once.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            retry_attempts: 0,
            retry_backoff: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Delay before retry number `retry` (0-based).
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2_u32.saturating_pow(retry.min(16)))
    }
}

/// A selection waiting to be written.
#[derive(Debug, Clone)]
pub(super) struct PersistRequest {
    pub(super) generation: u64,
    pub(super) group_id: String,
    pub(super) variables: BTreeMap<String, String>,
}

/// Progress shared between the manager and its worker.
#[derive(Debug)]
pub(super) struct PersistStatus {
    requested: AtomicU64,
    completed: watch::Sender<u64>,
    last_error: Mutex<Option<String>>,
}

impl PersistStatus {
    pub(super) fn new() -> Self {
        Self {
            requested: AtomicU64::new(0),
            completed: watch::Sender::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Reserves the next generation number.
    pub(super) fn next_generation(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(super) fn requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    pub(super) fn completed(&self) -> u64 {
        *self.completed.borrow()
    }

    pub(super) fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(super) fn set_last_error(&self, error: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    /// Marks everything up to `generation` as handled.
    pub(super) fn complete(&self, generation: u64) {
        self.completed.send_if_modified(|current| {
            if generation > *current {
                *current = generation;
                true
            } else {
                false
            }
        });
    }

    /// Waits until `generation` has been handled or the worker is gone.
    pub(super) async fn wait_for(&self, generation: u64) {
        let mut rx = self.completed.subscribe();
        // Err means the sender was dropped, nothing left to wait for
        let _ = rx.wait_for(|done| *done >= generation).await;
    }
}

/// Handle to a running persistence worker.
pub(super) struct PersistWorker {
    tx: flume::Sender<PersistRequest>,
    task: JoinHandle<()>,
}

impl PersistWorker {
    pub(super) fn spawn(
        store: Arc<dyn SettingsStore>,
        policy: PersistPolicy,
        status: Arc<PersistStatus>,
    ) -> Self {
        let (tx, rx) = flume::unbounded();
        let task = tokio::spawn(run(rx, store, policy, status));
        Self { tx, task }
    }

    /// Queues a request; returns it back if the worker has stopped.
    pub(super) fn submit(&self, request: PersistRequest) -> Result<(), PersistRequest> {
        self.tx.send(request).map_err(|e| e.into_inner())
    }

    /// Closes the queue and waits for pending requests to be written.
    pub(super) async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Persistence worker ended abnormally");
        }
    }
}

async fn run(
    rx: flume::Receiver<PersistRequest>,
    store: Arc<dyn SettingsStore>,
    policy: PersistPolicy,
    status: Arc<PersistStatus>,
) {
    while let Ok(first) = rx.recv_async().await {
        let request = newest(&rx, first);

        match persist_with_retry(store.as_ref(), &policy, &rx, &request).await {
            Outcome::Saved => {
                info!(group = %request.group_id, "Persisted active environment group");
                status.set_last_error(None);
            }
            Outcome::Superseded => {
                debug!(group = %request.group_id, "Selection superseded before it was saved");
            }
            Outcome::Failed(message) => {
                warn!(
                    group = %request.group_id,
                    error = %message,
                    "Failed to persist active environment group, keeping in-memory selection"
                );
                status.set_last_error(Some(message));
            }
        }

        status.complete(request.generation);
    }
    debug!(store = %store.describe(), "Persistence worker stopped");
}

/// Drains the queue, keeping only the most recent request.
fn newest(rx: &flume::Receiver<PersistRequest>, first: PersistRequest) -> PersistRequest {
    rx.drain().fold(first, |_, newer| newer)
}

enum Outcome {
    Saved,
    Superseded,
    Failed(String),
}

async fn persist_with_retry(
    store: &dyn SettingsStore,
    policy: &PersistPolicy,
    rx: &flume::Receiver<PersistRequest>,
    request: &PersistRequest,
) -> Outcome {
    let mut retry = 0;
    loop {
        let error = match persist_once(store, request).await {
            Ok(()) => return Outcome::Saved,
            Err(e) => e.to_string(),
        };

        if retry >= policy.retry_attempts() {
            return Outcome::Failed(error);
        }
        if !rx.is_empty() {
            return Outcome::Superseded;
        }

        let delay = policy.backoff_for(retry);
        debug!(
            group = %request.group_id,
            attempt = retry + 1,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            %error,
            "Retrying settings save"
        );
        tokio::time::sleep(delay).await;
        if !rx.is_empty() {
            return Outcome::Superseded;
        }
        retry += 1;
    }
}

/// Re-fetches the document, merges the selection in and saves it.
async fn persist_once(store: &dyn SettingsStore, request: &PersistRequest) -> StoreResult<()> {
    let mut settings = store.load().await?;
    settings.apply_selection(&request.group_id, &request.variables);
    store.save(&settings).await
}
