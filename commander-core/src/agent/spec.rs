//! Agent desired state (spec §3 Agent "Spec"): mutated only by operators or
//! by `AgentGroup` selector propagation, never by inbound agent messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::connection_info::ConnectionInfo;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartInfo {
    pub required_restarted_at: Option<DateTime<Utc>>,
}

/// Sorted, deduplicated references to standalone `AgentRemoteConfigResource`s
/// (spec §3: "remoteConfig.remoteConfigNames (sorted, deduplicated list)").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfigNames(Vec<String>);

impl RemoteConfigNames {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn set(&mut self, mut names: Vec<String>) {
        names.sort();
        names.dedup();
        self.0 = names;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAvailable {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// The server's demand to rename the agent; `None` means no pending
    /// rename (spec §3: "newInstanceUID ... nil if none").
    pub new_instance_uid: Option<Uuid>,
    pub restart_info: RestartInfo,
    pub connection_info: ConnectionInfo,
    pub remote_config: RemoteConfigNames,
    pub packages_available: Vec<PackageAvailable>,
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            new_instance_uid: None,
            restart_info: RestartInfo::default(),
            connection_info: ConnectionInfo::new(),
            remote_config: RemoteConfigNames::default(),
            packages_available: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_config_names_are_sorted_and_deduplicated() {
        let mut names = RemoteConfigNames::default();
        names.set(vec!["b".into(), "a".into(), "b".into()]);
        assert_eq!(names.names(), ["a", "b"]);
    }
}
