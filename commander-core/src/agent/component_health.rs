//! Component health and available-component trees (spec §3 Status
//! "componentHealth", "availableComponents"). Both are recursive: a
//! `BTreeMap` keyed by component name is sized regardless of the recursion
//! because the map's own storage, not inline field layout, holds the
//! children.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use commander_common::Hash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub healthy: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub last_error: String,
    pub status: String,
    pub status_time: Option<DateTime<Utc>>,
    pub children: BTreeMap<String, ComponentHealth>,
}

impl ComponentHealth {
    pub fn is_healthy_recursive(&self) -> bool {
        self.healthy && self.children.values().all(Self::is_healthy_recursive)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableComponent {
    pub version: String,
    pub components: BTreeMap<String, AvailableComponent>,
}

/// A tree of the component versions an agent is capable of running, with a
/// content hash so a server can detect that nothing changed since the last
/// report (spec §3: "availableComponents (tree with content hash)").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableComponents {
    pub components: BTreeMap<String, AvailableComponent>,
    hash: Hash,
}

impl Default for AvailableComponents {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl AvailableComponents {
    pub fn new(components: BTreeMap<String, AvailableComponent>) -> Self {
        let hash = Hash::of(&components);
        Self { components, hash }
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }
}
