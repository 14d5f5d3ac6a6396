// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The settings document shared with other configuration consumers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Legacy flat variable map, kept in sync with the active group.
pub const ENV_KEY: &str = "env";
/// Group collection: `{ id: { name, variables } }`.
pub const ENV_GROUPS_KEY: &str = "envGroups";
/// Identifier of the active group.
pub const ACTIVE_ENV_GROUP_KEY: &str = "activeEnvGroup";

/// Opaque settings document.
///
/// Only the three group-related fields are interpreted; every other field is
/// carried through load/save untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wraps a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets an arbitrary top-level field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Raw `envGroups` value, if present and non-null.
    #[must_use]
    pub fn env_groups(&self) -> Option<&Value> {
        self.get(ENV_GROUPS_KEY).filter(|v| !v.is_null())
    }

    /// `activeEnvGroup`, if it is a string.
    #[must_use]
    pub fn active_env_group(&self) -> Option<&str> {
        self.get(ACTIVE_ENV_GROUP_KEY).and_then(Value::as_str)
    }

    /// Raw legacy `env` value, if present and non-null.
    #[must_use]
    pub fn env(&self) -> Option<&Value> {
        self.get(ENV_KEY).filter(|v| !v.is_null())
    }

    /// Merges a selection into the document.
    ///
    /// Sets `activeEnvGroup` and mirrors the group's variables into `env`.
    /// `envGroups` and all unrelated fields are left as they are.
    pub fn apply_selection(&mut self, group_id: &str, variables: &BTreeMap<String, String>) {
        let env: Map<String, Value> = variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        self.0.insert(
            ACTIVE_ENV_GROUP_KEY.to_string(),
            Value::String(group_id.to_string()),
        );
        self.0.insert(ENV_KEY.to_string(), Value::Object(env));
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Name of a JSON value's type, for diagnostics.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
