// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Group commands: list, current, show, select, env.
//!
//! ```text
//! Config --> open_manager() --> EnvGroupManager (ready)
//!                                    |
//!          render_* (lines) <--------+--------> select + flush
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ManagerError, Result};
use crate::groups::EnvironmentGroup;
use crate::manager::{EnvGroupManager, InitOutcome};
use crate::store::{JsonFileStore, SettingsStore};

/// Opens the configured settings document and loads its groups.
///
/// # Errors
///
/// Returns an error if the settings document cannot be loaded.
pub async fn open_manager(config: &Config) -> Result<EnvGroupManager> {
    let store = JsonFileStore::new(&config.store.path);
    debug!(path = %store.path().display(), "Opening settings document");
    open_manager_with(Arc::new(store), config).await
}

/// Loads groups from an arbitrary store using the configured policy.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub async fn open_manager_with(
    store: Arc<dyn SettingsStore>,
    config: &Config,
) -> Result<EnvGroupManager> {
    let description = store.describe();
    let manager = EnvGroupManager::new(store).with_policy(config.persistence.to_policy());
    match manager.initialize().await {
        InitOutcome::Ready { .. } => Ok(manager),
        InitOutcome::NotReady => bail!("failed to load environment groups from {description}"),
    }
}

/// One line per group, active group marked with `*`.
#[must_use]
pub fn render_list(manager: &EnvGroupManager) -> Vec<String> {
    let groups = manager.groups();
    let active = manager.active_group_id();
    let width = groups.ids().map(str::len).max().unwrap_or(0);

    groups
        .iter()
        .map(|(id, group)| {
            let marker = if active.as_deref() == Some(id) { '*' } else { ' ' };
            format!(
                "{marker} {id:<width$}  {} ({})",
                group.name,
                plural_variables(group.variable_count())
            )
        })
        .collect()
}

/// Describes the active group, noting the fallback when its id is dangling.
#[must_use]
pub fn render_current(manager: &EnvGroupManager) -> Vec<String> {
    let active_id = manager.active_group_id().unwrap_or_default();
    if let Some(group) = manager.active_group() {
        return vec![format!("{active_id}  {}", group.name)];
    }

    match manager.effective_group() {
        Some((fallback_id, group)) => vec![format!(
            "{active_id}  (missing, using {fallback_id}  {})",
            group.name
        )],
        None => vec![format!("{active_id}  (missing)")],
    }
}

/// Name, id and variables of one group.
///
/// # Errors
///
/// Returns [`ManagerError::UnknownGroup`] if `id` does not exist.
pub fn render_show(manager: &EnvGroupManager, id: &str) -> Result<Vec<String>> {
    let group = lookup(manager, id)?;
    let mut lines = vec![
        format!("{} ({id})", group.name),
        plural_variables(group.variable_count()),
    ];
    lines.extend(
        group
            .variables
            .iter()
            .map(|(key, value)| format!("  {key}={value}")),
    );
    Ok(lines)
}

/// `KEY=VALUE` lines for a group, or for the effective group when `id` is `None`.
///
/// # Errors
///
/// Returns [`ManagerError::UnknownGroup`] if `id` does not exist, or an error
/// if no group is available at all.
pub fn render_env(manager: &EnvGroupManager, id: Option<&str>) -> Result<Vec<String>> {
    let group = match id {
        Some(id) => lookup(manager, id)?,
        None => {
            manager
                .effective_group()
                .context("no environment groups defined")?
                .1
        }
    };
    Ok(group
        .variables
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect())
}

/// Selects a group and waits until the choice is saved.
///
/// # Errors
///
/// Returns an error if the group does not exist, the manager is not loaded,
/// or the selection could not be written.
pub async fn select(manager: &EnvGroupManager, id: &str) -> Result<()> {
    if manager.group(id).is_none() {
        return Err(ManagerError::UnknownGroup(id.to_string()).into());
    }
    manager.select_group(id)?;
    manager.flush().await;

    if let Some(error) = manager.last_persist_error() {
        bail!("selected '{id}' but failed to save it: {error}");
    }
    info!(group = %id, "Selection saved");
    Ok(())
}

/// Main handler for `list`.
///
/// # Errors
///
/// Returns an error if the settings document cannot be loaded.
pub async fn run_list_command(config: &Config) -> Result<()> {
    let manager = open_manager(config).await?;
    print_lines(&render_list(&manager), "No environment groups defined");
    manager.shutdown().await;
    Ok(())
}

/// Main handler for `current`.
///
/// # Errors
///
/// Returns an error if the settings document cannot be loaded.
pub async fn run_current_command(config: &Config) -> Result<()> {
    let manager = open_manager(config).await?;
    print_lines(&render_current(&manager), "");
    manager.shutdown().await;
    Ok(())
}

/// Main handler for `show <id>`.
///
/// # Errors
///
/// Returns an error if loading fails or the group does not exist.
pub async fn run_show_command(config: &Config, id: &str) -> Result<()> {
    let manager = open_manager(config).await?;
    let result = render_show(&manager, id).map(|lines| print_lines(&lines, ""));
    manager.shutdown().await;
    result
}

/// Main handler for `select <id>`.
///
/// # Errors
///
/// Returns an error if loading fails, the group does not exist, or the
/// selection could not be saved.
pub async fn run_select_command(config: &Config, id: &str) -> Result<()> {
    let manager = open_manager(config).await?;
    let result = select(&manager, id).await;
    if result.is_ok()
        && let Some(group) = manager.active_group()
    {
        println!("{id}  {}", group.name);
    }
    manager.shutdown().await;
    result
}

/// Main handler for `env [id]`.
///
/// # Errors
///
/// Returns an error if loading fails or the group does not exist.
pub async fn run_env_command(config: &Config, id: Option<&str>) -> Result<()> {
    let manager = open_manager(config).await?;
    let result = render_env(&manager, id).map(|lines| print_lines(&lines, ""));
    manager.shutdown().await;
    result
}

fn lookup(manager: &EnvGroupManager, id: &str) -> Result<EnvironmentGroup> {
    manager
        .group(id)
        .ok_or_else(|| ManagerError::UnknownGroup(id.to_string()).into())
}

fn plural_variables(count: usize) -> String {
    if count == 1 {
        "1 variable".to_string()
    } else {
        format!("{count} variables")
    }
}

fn print_lines(lines: &[String], empty: &str) {
    if lines.is_empty() {
        if !empty.is_empty() {
            println!("{empty}");
        }
    } else {
        for line in lines {
            println!("{line}");
        }
    }
}
