//! `AgentGroup` (spec §3 "AgentGroup", §4.2 "AgentGroup"): selector-based
//! cohorts, priority resolution among overlapping groups, and a statistics
//! rollup computed by querying the Agent store with the group's selector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commander_common::db::Selector;
use serde::{Deserialize, Serialize};

use crate::{
    agent::Agent,
    attributes::Attributes,
    condition::{ConditionStatus, ConditionType, Conditions},
    error::CoreError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentGroupMetadata {
    pub name: String,
    pub priority: i64,
    /// Labels describing the group itself, distinct from `selector` (which
    /// matches *agents* into the group).
    pub attributes: Attributes,
    pub selector: Selector,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConnectionConfig {
    pub polling_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentGroupSpec {
    pub agent_remote_configs: Vec<String>,
    pub agent_connection_config: Option<AgentConnectionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentGroupStatus {
    pub num_agents: u64,
    pub num_connected_agents: u64,
    pub num_healthy_agents: u64,
    pub num_unhealthy_agents: u64,
    pub num_not_connected_agents: u64,
    pub conditions: Conditions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentGroup {
    pub metadata: AgentGroupMetadata,
    pub spec: AgentGroupSpec,
    pub status: AgentGroupStatus,
}

impl AgentGroup {
    pub fn new(name: impl Into<String>, priority: i64, selector: Selector) -> Self {
        Self {
            metadata: AgentGroupMetadata {
                name: name.into(),
                priority,
                attributes: Attributes::new(),
                selector,
                deleted_at: None,
            },
            spec: AgentGroupSpec::default(),
            status: AgentGroupStatus::default(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.metadata.deleted_at.is_some()
    }

    /// Soft delete: sets `deletedAt` and appends a Deleted condition; list
    /// operations are expected to filter on `is_deleted()` at the
    /// persistence layer (spec §4.2 "Delete").
    pub fn mark_deleted(&mut self, by: &str, now: DateTime<Utc>) {
        self.metadata.deleted_at = Some(now);
        self.status
            .conditions
            .set(ConditionType::Deleted, ConditionStatus::True, "Deleted", by, now);
    }

    /// `GetDeletedBy`/`GetDeletedAt` (spec §4.2): reads from conditions as a
    /// fallback for records written before `metadata.deletedAt` existed.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.metadata.deleted_at.or_else(|| {
            self.status
                .conditions
                .get(ConditionType::Deleted)
                .filter(|c| c.status == ConditionStatus::True)
                .map(|c| c.last_transition_time)
        })
    }

    pub fn deleted_by(&self) -> Option<&str> {
        self.status
            .conditions
            .get(ConditionType::Deleted)
            .filter(|c| c.status == ConditionStatus::True)
            .map(|c| c.message.as_str())
    }

    /// Recompute `status` from a snapshot of every Agent matching this
    /// group's selector (spec §4.2 "Statistics rollup"). Callers obtain the
    /// snapshot from the persistence `ListBySelector` port; kept as a pure
    /// function of that snapshot so it needs no async/IO capability itself.
    pub fn recompute_statistics(&mut self, matching_agents: &[Agent]) {
        let num_agents = matching_agents.len() as u64;
        let num_connected_agents = matching_agents.iter().filter(|a| a.status.connected).count() as u64;
        let num_healthy_agents = matching_agents
            .iter()
            .filter(|a| a.status.connected && a.status.component_health.is_healthy_recursive())
            .count() as u64;
        let num_unhealthy_agents = num_connected_agents - num_healthy_agents;
        let num_not_connected_agents = num_agents - num_connected_agents;

        self.status.num_agents = num_agents;
        self.status.num_connected_agents = num_connected_agents;
        self.status.num_healthy_agents = num_healthy_agents;
        self.status.num_unhealthy_agents = num_unhealthy_agents;
        self.status.num_not_connected_agents = num_not_connected_agents;
    }
}

/// The subset of the persistence outbound port (spec §6) that selector
/// resolution and statistics rollup need: list every Agent matching a
/// selector. Implemented by both backend bindings in `persistence`.
#[async_trait]
pub trait AgentLookup: Send + Sync {
    async fn list_by_selector(&self, selector: &Selector) -> Result<Vec<Agent>, CoreError>;
}

/// Resolve which groups apply to an agent description, in descending
/// `priority` order with a lexicographic tie-break on group name (spec §4.2
/// "Selector resolution").
pub fn resolve_matching_groups<'a>(
    groups: &'a [AgentGroup],
    identifying: &std::collections::BTreeMap<String, String>,
    non_identifying: &std::collections::BTreeMap<String, String>,
) -> Vec<&'a AgentGroup> {
    let mut matching: Vec<&AgentGroup> = groups
        .iter()
        .filter(|g| !g.is_deleted() && g.metadata.selector.matches(identifying, non_identifying))
        .collect();

    matching.sort_by(|a, b| {
        b.metadata
            .priority
            .cmp(&a.metadata.priority)
            .then_with(|| a.metadata.name.cmp(&b.metadata.name))
    });
    matching
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use uuid::Uuid;

    use super::*;

    fn t(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    fn agent_with(connected: bool, healthy: bool) -> Agent {
        let mut agent = Agent::new(Uuid::new_v4());
        agent.status.connected = connected;
        agent.status.component_health.healthy = healthy;
        agent
    }

    #[test]
    fn statistics_rollup_matches_spec_invariants() {
        let mut group = AgentGroup::new("g1", 0, Selector::default());
        let agents = vec![
            agent_with(true, true),
            agent_with(true, true),
            agent_with(true, true),
            agent_with(true, false),
            agent_with(false, false),
            agent_with(false, false),
        ];
        group.recompute_statistics(&agents);

        assert_eq!(group.status.num_agents, 6);
        assert_eq!(group.status.num_connected_agents, 4);
        assert_eq!(group.status.num_healthy_agents, 3);
        assert_eq!(group.status.num_unhealthy_agents, 1);
        assert_eq!(group.status.num_not_connected_agents, 2);
        assert_eq!(
            group.status.num_agents,
            group.status.num_connected_agents + group.status.num_not_connected_agents
        );
        assert_eq!(
            group.status.num_connected_agents,
            group.status.num_healthy_agents + group.status.num_unhealthy_agents
        );
    }

    #[test]
    fn selector_resolution_orders_by_priority_then_name() {
        let low = AgentGroup::new("zzz", 1, Selector::default());
        let high = AgentGroup::new("aaa", 10, Selector::default());
        let tie_a = AgentGroup::new("a", 5, Selector::default());
        let tie_b = AgentGroup::new("b", 5, Selector::default());
        let groups = vec![low, high, tie_a, tie_b];

        let resolved = resolve_matching_groups(&groups, &BTreeMap::new(), &BTreeMap::new());
        let names: Vec<&str> = resolved.iter().map(|g| g.metadata.name.as_str()).collect();
        assert_eq!(names, ["aaa", "a", "b", "zzz"]);
    }

    #[test]
    fn soft_deleted_groups_are_excluded_from_resolution() {
        let mut deleted = AgentGroup::new("gone", 100, Selector::default());
        deleted.mark_deleted("operator", t(1));
        let groups = vec![deleted];
        let resolved = resolve_matching_groups(&groups, &BTreeMap::new(), &BTreeMap::new());
        assert!(resolved.is_empty());
    }
}
