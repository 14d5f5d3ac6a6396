// envgroups: Environment Group Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment group model and settings normalization.
//!
//! # Architecture
//!
//! ```text
//! EnvironmentGroup: name + BTreeMap<String, String>
//! GroupCollection:  BTreeMap<id, EnvironmentGroup> (deterministic order)
//!
//! Settings --normalize()--> LoadedGroups { groups, active_id, origin }
//!   envGroups object with usable entries --> Grouped (adopted as-is)
//!   anything else                         --> Migrated ("default" from env)
//! ```

pub mod migrate;
pub mod types;


pub use migrate::{GroupOrigin, LoadedGroups, normalize};
pub use types::{EnvironmentGroup, GroupCollection};

/// Identifier of the canonical fallback group.
pub const DEFAULT_GROUP_ID: &str = "default";

/// Display name of the canonical fallback group.
pub const DEFAULT_GROUP_NAME: &str = "Default";
