// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Normalizes a loaded settings document into the group model.
//!
//! ```text
//! envGroups is a non-null object?
//!   yes --> parse entries (malformed ones skipped)
//!             any left? --> Grouped, active = activeEnvGroup or "default"
//!             none      --> fall through
//!   no  --> Migrated: { "default": { "Default", env or {} } }, active = "default"
//! ```
//!
//! Normalization never fails; bad input degrades to the legacy path.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::{DEFAULT_GROUP_ID, EnvironmentGroup, GroupCollection};
use crate::store::Settings;
use crate::store::settings::json_kind;

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrigin {
    /// Adopted from `envGroups`.
    Grouped,
    /// Synthesized from the legacy flat `env` map.
    Migrated,
}

/// Result of normalizing a settings document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedGroups {
    pub groups: GroupCollection,
    pub active_id: String,
    pub origin: GroupOrigin,
}

/// Builds the group model from a settings document.
///
/// The active id is taken as stored, even if it does not name a loaded group.
#[must_use]
pub fn normalize(settings: &Settings) -> LoadedGroups {
    if let Some(raw) = settings.env_groups() {
        match raw {
            Value::Object(entries) => {
                let groups = parse_groups(entries);
                if groups.is_empty() {
                    warn!("envGroups has no usable entries, migrating legacy env");
                } else {
                    let active_id = settings
                        .active_env_group()
                        .filter(|id| !id.is_empty())
                        .unwrap_or(DEFAULT_GROUP_ID)
                        .to_string();
                    debug!(groups = groups.len(), active = %active_id, "Adopted envGroups");
                    return LoadedGroups {
                        groups,
                        active_id,
                        origin: GroupOrigin::Grouped,
                    };
                }
            }
            other => {
                warn!(found = %json_kind(other), "envGroups is not an object, migrating legacy env");
            }
        }
    }

    let variables = settings.env().map(legacy_variables).unwrap_or_default();
    info!(
        variables = variables.len(),
        "Migrating legacy env into the default group"
    );
    LoadedGroups {
        groups: GroupCollection::with_default(variables),
        active_id: DEFAULT_GROUP_ID.to_string(),
        origin: GroupOrigin::Migrated,
    }
}

fn parse_groups(entries: &Map<String, Value>) -> GroupCollection {
    entries
        .iter()
        .filter_map(|(id, value)| match parse_group(id, value) {
            Ok(group) => Some((id.clone(), group)),
            Err(reason) => {
                warn!(group = %id, %reason, "Skipping malformed environment group");
                None
            }
        })
        .collect()
}

/// Stored form of an `envGroups` entry; both fields may be absent or null.
#[derive(Deserialize)]
struct StoredGroup {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    variables: Option<BTreeMap<String, String>>,
}

/// Parses one `envGroups` entry.
///
/// A missing or blank `name` falls back to the id; missing `variables` is empty.
fn parse_group(id: &str, value: &Value) -> Result<EnvironmentGroup, String> {
    let stored = StoredGroup::deserialize(value).map_err(|e| e.to_string())?;

    let name = stored
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| id.to_string());

    Ok(EnvironmentGroup {
        name,
        variables: stored.variables.unwrap_or_default(),
    })
}

/// Reads the legacy flat map; non-string values are dropped.
fn legacy_variables(env: &Value) -> BTreeMap<String, String> {
    let Value::Object(vars) = env else {
        warn!(found = %json_kind(env), "Legacy env is not an object, ignoring it");
        return BTreeMap::new();
    };

    vars.iter()
        .filter_map(|(key, value)| {
            if let Value::String(s) = value {
                Some((key.clone(), s.clone()))
            } else {
                warn!(variable = %key, "Ignoring non-string legacy env value");
                None
            }
        })
        .collect()
}
