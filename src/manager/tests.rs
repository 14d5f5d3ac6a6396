// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::{EnvGroupManager, InitOutcome, PersistPolicy, Readiness};
use crate::error::ManagerError;
use crate::groups::{EnvironmentGroup, GroupCollection};
use crate::store::{MemoryStore, Settings};
use crate::test_utils::{FlakyStore, GatedStore, LogCapture};

fn settings(value: serde_json::Value) -> Settings {
    Settings::from_value(value).expect("test settings must be an object")
}

fn two_groups() -> Settings {
    settings(json!({
        "envGroups": {
            "g1": { "name": "Prod", "variables": { "X": "9" } },
            "g2": { "name": "Dev", "variables": {} }
        },
        "activeEnvGroup": "g2"
    }))
}

fn manager_for(store: &Arc<FlakyStore>) -> EnvGroupManager {
    EnvGroupManager::new(store.clone()).with_policy(PersistPolicy::no_retry())
}

#[tokio::test]
async fn test_initialize_migrates_legacy_env() {
    let store = Arc::new(FlakyStore::new(settings(json!({ "env": { "A": "1" } }))));
    let manager = manager_for(&store);

    let outcome = manager.initialize().await;

    assert_eq!(
        outcome,
        InitOutcome::Ready {
            groups: GroupCollection::with_default(
                [("A".to_string(), "1".to_string())].into_iter().collect()
            ),
            active_id: "default".to_string(),
        }
    );
    assert_eq!(manager.readiness(), Readiness::Ready);
    assert_eq!(
        manager.active_group(),
        Some(EnvironmentGroup::new("Default").with_var("A", "1"))
    );
    assert_eq!(store.save_attempts(), 0, "initialize must not write");
}

#[tokio::test]
async fn test_initialize_passes_groups_through() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);

    let InitOutcome::Ready { groups, active_id } = manager.initialize().await else {
        panic!("expected a ready manager");
    };

    assert_eq!(active_id, "g2");
    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups.get("g1"),
        Some(&EnvironmentGroup::new("Prod").with_var("X", "9"))
    );
    assert_eq!(manager.active_group().map(|g| g.name), Some("Dev".to_string()));
}

#[tokio::test]
async fn test_dangling_active_id_degrades_readers() {
    let store = Arc::new(FlakyStore::new(settings(json!({
        "envGroups": {
            "g1": { "name": "Prod", "variables": { "X": "9" } },
            "g2": { "name": "Dev", "variables": {} }
        },
        "activeEnvGroup": "g3"
    }))));
    let manager = manager_for(&store);
    manager.initialize().await;

    assert_eq!(manager.active_group_id().as_deref(), Some("g3"));
    assert_eq!(manager.active_group(), None);
    assert_eq!(manager.variable_count("g3"), 0);
    assert_eq!(
        manager.effective_group().map(|(id, _)| id).as_deref(),
        Some("g1")
    );
}

#[tokio::test]
async fn test_effective_group_prefers_default() {
    let store = Arc::new(FlakyStore::new(settings(json!({
        "envGroups": {
            "a": { "name": "A" },
            "default": { "name": "Default" }
        },
        "activeEnvGroup": "gone"
    }))));
    let manager = manager_for(&store);
    manager.initialize().await;

    assert_eq!(
        manager.effective_group().map(|(id, _)| id).as_deref(),
        Some("default")
    );

    manager.select_group("a").unwrap();
    assert_eq!(
        manager.effective_group().map(|(id, _)| id).as_deref(),
        Some("a")
    );
}

#[tokio::test]
async fn test_select_persists_merged_document() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;

    // Another consumer writes an unrelated field after our load
    let mut external = two_groups();
    external.insert("theme", json!("dark"));
    store.inner().replace(external).unwrap();

    manager.select_group("g1").unwrap();
    manager.flush().await;

    let saved = store.inner().snapshot().unwrap();
    assert_eq!(
        saved.into_value(),
        json!({
            "envGroups": {
                "g1": { "name": "Prod", "variables": { "X": "9" } },
                "g2": { "name": "Dev", "variables": {} }
            },
            "activeEnvGroup": "g1",
            "env": { "X": "9" },
            "theme": "dark"
        })
    );
    assert!(manager.is_synced());
}

#[tokio::test]
async fn test_selection_visible_before_persistence() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;

    manager.select_group("g1").unwrap();

    // Current-thread runtime: the worker has not run yet
    assert_eq!(store.save_attempts(), 0);
    assert_eq!(manager.active_group().map(|g| g.name), Some("Prod".to_string()));
    assert!(!manager.is_synced());

    manager.flush().await;
    assert_eq!(store.save_attempts(), 1);
}

#[tokio::test]
async fn test_counts() {
    let store = Arc::new(FlakyStore::new(settings(json!({
        "envGroups": {
            "a": { "name": "A", "variables": { "A": "1", "B": "2" } },
            "b": { "name": "B" },
            "c": { "name": "C", "variables": {} }
        },
        "activeEnvGroup": "a"
    }))));
    let manager = manager_for(&store);
    manager.initialize().await;

    assert_eq!(manager.group_count(), 3);
    assert_eq!(manager.variable_count("a"), 2);
    assert_eq!(manager.variable_count("b"), 0);
    assert_eq!(manager.variable_count("missing"), 0);
}

#[tokio::test]
async fn test_save_failure_keeps_selection() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;
    store.fail_next_saves(usize::MAX);

    let logs = LogCapture::start();
    manager.select_group("g1").unwrap();
    manager.flush().await;

    assert_eq!(manager.active_group_id().as_deref(), Some("g1"));
    assert!(
        manager
            .last_persist_error()
            .is_some_and(|e| e.contains("save refused"))
    );
    assert!(!manager.is_synced());
    assert!(logs.output().contains("Failed to persist active environment group"));
    assert_eq!(
        store.inner().snapshot().unwrap().active_env_group(),
        Some("g2")
    );

    store.fail_next_saves(0);
    manager.select_group("g1").unwrap();
    manager.flush().await;

    assert_eq!(manager.last_persist_error(), None);
    assert!(manager.is_synced());
}

#[tokio::test]
async fn test_refetch_failure_keeps_selection() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;
    store.fail_loads(true);

    let logs = LogCapture::start();
    manager.select_group("g1").unwrap();
    manager.flush().await;

    assert_eq!(manager.active_group_id().as_deref(), Some("g1"));
    assert!(
        manager
            .last_persist_error()
            .is_some_and(|e| e.contains("load refused"))
    );
    assert_eq!(store.save_attempts(), 0);
    assert!(!manager.is_synced());
    assert!(logs.output().contains("Failed to persist active environment group"));
}

#[tokio::test]
async fn test_selection_during_inflight_save_is_written_after_it() {
    let store = Arc::new(GatedStore::new(two_groups()));
    let manager = EnvGroupManager::new(store.clone()).with_policy(PersistPolicy::no_retry());
    manager.initialize().await;

    manager.select_group("g1").unwrap();
    store.wait_for_save().await;

    // The g1 save is blocked inside the store
    manager.select_group("g2").unwrap();
    store.release(2);
    manager.flush().await;

    assert_eq!(store.saved_ids(), vec!["g1".to_string(), "g2".to_string()]);
    let saved = store.inner().snapshot().unwrap();
    assert_eq!(saved.active_env_group(), Some("g2"));
    assert_eq!(saved.env(), Some(&json!({})));
    assert!(manager.is_synced());
}

#[tokio::test]
async fn test_retry_abandoned_when_newer_selection_queued() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = EnvGroupManager::new(store.clone()).with_policy(
        PersistPolicy::builder()
            .with_retry_attempts(3)
            .with_retry_backoff(Duration::from_millis(50))
            .build(),
    );
    manager.initialize().await;
    store.fail_next_saves(1);

    manager.select_group("g1").unwrap();
    while store.save_attempts() == 0 {
        tokio::task::yield_now().await;
    }

    // The g1 save failed and the worker is in its backoff
    manager.select_group("g2").unwrap();
    manager.flush().await;

    assert_eq!(store.save_attempts(), 2, "g1 must not be retried");
    assert_eq!(
        store.inner().snapshot().unwrap().active_env_group(),
        Some("g2")
    );
    assert_eq!(manager.last_persist_error(), None);
    assert!(manager.is_synced());
}

#[tokio::test]
async fn test_save_retries_then_succeeds() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = EnvGroupManager::new(store.clone()).with_policy(
        PersistPolicy::builder()
            .with_retry_attempts(2)
            .with_retry_backoff(Duration::ZERO)
            .build(),
    );
    manager.initialize().await;
    store.fail_next_saves(2);

    manager.select_group("g1").unwrap();
    manager.flush().await;

    assert_eq!(store.save_attempts(), 3);
    assert_eq!(manager.last_persist_error(), None);
    assert_eq!(
        store.inner().snapshot().unwrap().active_env_group(),
        Some("g1")
    );
}

#[tokio::test]
async fn test_load_failure_is_not_ready() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    store.fail_loads(true);
    let manager = manager_for(&store);

    let logs = LogCapture::start();
    assert_eq!(manager.initialize().await, InitOutcome::NotReady);
    assert!(logs.output().contains("Failed to load environment groups"));

    assert_eq!(manager.readiness(), Readiness::NotReady);
    assert_eq!(manager.group_count(), 0);
    assert_eq!(manager.active_group(), None);
    assert_eq!(manager.select_group("g1"), Err(ManagerError::NotReady));
    assert_eq!(store.save_attempts(), 0);

    store.fail_loads(false);
    assert!(matches!(
        manager.initialize().await,
        InitOutcome::Ready { .. }
    ));
    assert_eq!(manager.group_count(), 2);
}

#[tokio::test]
async fn test_select_before_initialize_is_rejected() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);

    assert_eq!(manager.readiness(), Readiness::Loading);
    assert_eq!(manager.select_group("g1"), Err(ManagerError::NotReady));
    assert_eq!(manager.active_group_id(), None);

    manager.flush().await;
    assert_eq!(store.save_attempts(), 0);
}

#[tokio::test]
async fn test_rapid_selections_last_write_wins() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;

    for id in ["g1", "g2", "g1", "g2", "g1"] {
        manager.select_group(id).unwrap();
    }
    assert_eq!(manager.active_group_id().as_deref(), Some("g1"));

    manager.flush().await;

    // Queued selections collapse into one write of the newest
    assert_eq!(store.save_attempts(), 1);
    let saved = store.inner().snapshot().unwrap();
    assert_eq!(saved.active_env_group(), Some("g1"));
    assert_eq!(saved.env(), Some(&json!({ "X": "9" })));
}

#[tokio::test]
async fn test_unknown_group_is_persisted_with_empty_env() {
    let store = Arc::new(FlakyStore::new(two_groups()));
    let manager = manager_for(&store);
    manager.initialize().await;

    manager.select_group("ghost").unwrap();
    manager.flush().await;

    assert_eq!(manager.active_group(), None);
    let saved = store.inner().snapshot().unwrap();
    assert_eq!(saved.active_env_group(), Some("ghost"));
    assert_eq!(saved.env(), Some(&json!({})));
}

#[tokio::test]
async fn test_shutdown_drains_pending_selection() {
    let store = Arc::new(MemoryStore::new(two_groups()));
    let manager = EnvGroupManager::new(store.clone()).with_policy(PersistPolicy::no_retry());
    manager.initialize().await;

    manager.select_group("g1").unwrap();
    manager.shutdown().await;

    assert_eq!(store.save_count(), 1);
    assert_eq!(store.snapshot().unwrap().active_env_group(), Some("g1"));
}

#[test]
fn test_persist_policy_backoff() {
    let policy = PersistPolicy::builder()
        .with_retry_backoff(Duration::from_millis(50))
        .build();

    assert_eq!(policy.retry_attempts(), 2);
    assert_eq!(policy.backoff_for(0), Duration::from_millis(50));
    assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
    assert_eq!(PersistPolicy::no_retry().retry_attempts(), 0);
}
