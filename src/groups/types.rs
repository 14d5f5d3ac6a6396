// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Types for environment groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DEFAULT_GROUP_ID, DEFAULT_GROUP_NAME};

/// A named set of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentGroup {
    /// Display label.
    pub name: String,
    /// Variable name to value.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl EnvironmentGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
        }
    }

    /// Sets a variable, builder style.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

/// Group id to group, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupCollection(BTreeMap<String, EnvironmentGroup>);

impl GroupCollection {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Collection holding only the `"default"` group with the given variables.
    #[must_use]
    pub fn with_default(variables: BTreeMap<String, String>) -> Self {
        let mut groups = Self::new();
        groups.insert(
            DEFAULT_GROUP_ID,
            EnvironmentGroup {
                name: DEFAULT_GROUP_NAME.to_string(),
                variables,
            },
        );
        groups
    }

    pub fn insert(&mut self, id: impl Into<String>, group: EnvironmentGroup) -> &mut Self {
        self.0.insert(id.into(), group);
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EnvironmentGroup> {
        self.0.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lexicographically first group id.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvironmentGroup)> {
        self.0.iter().map(|(id, group)| (id.as_str(), group))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Inserts an empty `"default"` group if it is missing.
    ///
    /// Returns `true` if the group was created.
    pub fn ensure_default(&mut self) -> bool {
        if self.contains(DEFAULT_GROUP_ID) {
            return false;
        }
        self.insert(DEFAULT_GROUP_ID, EnvironmentGroup::new(DEFAULT_GROUP_NAME));
        true
    }

    /// Variable count for a group, 0 when the group is absent.
    #[must_use]
    pub fn variable_count(&self, id: &str) -> usize {
        self.get(id).map_or(0, EnvironmentGroup::variable_count)
    }
}

impl FromIterator<(String, EnvironmentGroup)> for GroupCollection {
    fn from_iter<I: IntoIterator<Item = (String, EnvironmentGroup)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
