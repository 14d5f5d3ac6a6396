// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment group manager.
//!
//! ```text
//! EnvGroupManager::new(store)
//!   .with_policy(PersistPolicy)
//!
//! initialize().await          Loading --> Ready(groups, active) | NotReady
//! select_group(id)            memory updated now, persistence queued
//! flush().await               wait for queued persistence
//! active_group() / group_count() / variable_count(id)
//! shutdown().await            drain queue, stop worker
//! ```
//!
//! Selections are rejected with [`ManagerError::NotReady`] until a load has
//! succeeded. Persistence failures are logged and exposed through
//! [`EnvGroupManager::last_persist_error`]; the in-memory selection is never
//! rolled back.

pub mod persist;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info, instrument, warn};

use crate::error::ManagerError;
use crate::groups::{self, DEFAULT_GROUP_ID, EnvironmentGroup, GroupCollection};
use crate::store::SettingsStore;

use persist::{PersistRequest, PersistStatus, PersistWorker};

pub use persist::PersistPolicy;

/// Load state of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    /// No load has completed yet.
    #[default]
    Loading,
    /// Groups are loaded and selections are accepted.
    Ready,
    /// The last load failed; nothing is exposed.
    NotReady,
}

/// Result of [`EnvGroupManager::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Ready {
        groups: GroupCollection,
        active_id: String,
    },
    NotReady,
}

#[derive(Debug, Default)]
struct ManagerState {
    readiness: Readiness,
    groups: GroupCollection,
    active_id: Option<String>,
}

/// Owns the loaded groups and the active selection.
///
/// Share it behind an `Arc`; all methods take `&self`.
pub struct EnvGroupManager {
    store: Arc<dyn SettingsStore>,
    policy: PersistPolicy,
    state: RwLock<ManagerState>,
    status: Arc<PersistStatus>,
    worker: Mutex<Option<PersistWorker>>,
}

impl EnvGroupManager {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            policy: PersistPolicy::default(),
            state: RwLock::new(ManagerState::default()),
            status: Arc::new(PersistStatus::new()),
            worker: Mutex::new(None),
        }
    }

    /// Sets the retry policy used for persisting selections.
    #[must_use]
    pub fn with_policy(mut self, policy: PersistPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &PersistPolicy {
        &self.policy
    }

    /// Loads settings and builds the group model.
    ///
    /// Never fails: a store error leaves the manager [`Readiness::NotReady`]
    /// with no groups, and a later call may retry. Does not write to the store.
    #[instrument(skip(self), fields(store = %self.store.describe()))]
    pub async fn initialize(&self) -> InitOutcome {
        {
            let mut state = self.write_state();
            state.readiness = Readiness::Loading;
        }

        let settings = match self.store.load().await {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Failed to load environment groups");
                let mut state = self.write_state();
                *state = ManagerState {
                    readiness: Readiness::NotReady,
                    ..ManagerState::default()
                };
                return InitOutcome::NotReady;
            }
        };

        let loaded = groups::normalize(&settings);
        if !loaded.groups.contains(&loaded.active_id) {
            warn!(
                active = %loaded.active_id,
                "Active environment group does not exist"
            );
        }
        info!(
            groups = loaded.groups.len(),
            active = %loaded.active_id,
            origin = ?loaded.origin,
            "Environment groups loaded"
        );

        self.ensure_worker();

        let mut state = self.write_state();
        *state = ManagerState {
            readiness: Readiness::Ready,
            groups: loaded.groups.clone(),
            active_id: Some(loaded.active_id.clone()),
        };

        InitOutcome::Ready {
            groups: loaded.groups,
            active_id: loaded.active_id,
        }
    }

    /// Makes `group_id` the active group and queues persistence.
    ///
    /// The new selection is visible to readers before this returns; the store
    /// is updated in the background. Ids missing from the collection are
    /// accepted and persisted as-is with an empty `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotReady`] if no load has succeeded. The
    /// selection is not applied in that case.
    pub fn select_group(&self, group_id: &str) -> Result<(), ManagerError> {
        // Held until the request is queued so queue order matches selection order
        let mut state = self.write_state();
        if state.readiness != Readiness::Ready {
            warn!(group = %group_id, readiness = ?state.readiness, "Rejecting selection before groups are loaded");
            return Err(ManagerError::NotReady);
        }

        let variables = state.groups.get(group_id).map_or_else(
            || {
                warn!(group = %group_id, "Selecting an environment group that does not exist");
                BTreeMap::new()
            },
            |group| group.variables.clone(),
        );
        state.active_id = Some(group_id.to_string());
        info!(group = %group_id, "Selected environment group");

        let request = PersistRequest {
            generation: self.status.next_generation(),
            group_id: group_id.to_string(),
            variables,
        };
        let generation = request.generation;

        let submitted = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|worker| worker.submit(request));
        drop(state);

        if !matches!(submitted, Some(Ok(()))) {
            error!(group = %group_id, "Persistence worker is not running, selection not saved");
            self.status
                .set_last_error(Some("persistence worker is not running".to_string()));
            self.status.complete(generation);
        }

        Ok(())
    }

    /// Current load state.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.read_state().readiness
    }

    /// Id of the active group, `None` unless loaded.
    #[must_use]
    pub fn active_group_id(&self) -> Option<String> {
        self.read_state().active_id.clone()
    }

    /// The active group, or `None` if nothing is loaded or the id is dangling.
    #[must_use]
    pub fn active_group(&self) -> Option<EnvironmentGroup> {
        let state = self.read_state();
        state
            .active_id
            .as_deref()
            .and_then(|id| state.groups.get(id))
            .cloned()
    }

    /// The active group, falling back when the active id is dangling.
    ///
    /// Fallback order: `"default"`, then the lexicographically first id.
    /// Does not change the selection.
    #[must_use]
    pub fn effective_group(&self) -> Option<(String, EnvironmentGroup)> {
        let state = self.read_state();
        let groups = &state.groups;
        state
            .active_id
            .as_deref()
            .filter(|id| groups.contains(id))
            .or_else(|| groups.contains(DEFAULT_GROUP_ID).then_some(DEFAULT_GROUP_ID))
            .or_else(|| groups.first_id())
            .and_then(|id| groups.get(id).map(|group| (id.to_string(), group.clone())))
    }

    /// Snapshot of all loaded groups (empty unless ready).
    #[must_use]
    pub fn groups(&self) -> GroupCollection {
        self.read_state().groups.clone()
    }

    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<EnvironmentGroup> {
        self.read_state().groups.get(group_id).cloned()
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.read_state().groups.len()
    }

    /// Variables in a group, 0 if the group is absent.
    #[must_use]
    pub fn variable_count(&self, group_id: &str) -> usize {
        self.read_state().groups.variable_count(group_id)
    }

    /// Message of the most recent failed save, cleared by the next success.
    #[must_use]
    pub fn last_persist_error(&self) -> Option<String> {
        self.status.last_error()
    }

    /// Whether every selection so far has been written successfully.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.status.completed() >= self.status.requested() && self.status.last_error().is_none()
    }

    /// Waits until all selections made so far are persisted or have failed.
    pub async fn flush(&self) {
        let target = self.status.requested();
        self.status.wait_for(target).await;
    }

    /// Writes out pending selections and stops the persistence worker.
    pub async fn shutdown(self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            worker.shutdown().await;
        }
    }

    fn ensure_worker(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_none() {
            *worker = Some(PersistWorker::spawn(
                Arc::clone(&self.store),
                self.policy,
                Arc::clone(&self.status),
            ));
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ManagerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ManagerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EnvGroupManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvGroupManager")
            .field("store", &self.store.describe())
            .field("policy", &self.policy)
            .field("state", &*self.read_state())
            .finish_non_exhaustive()
    }
}
