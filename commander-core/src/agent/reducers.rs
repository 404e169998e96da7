//! Agent reducers (spec §4.1): idempotent `Report*` operations applied to
//! every inbound agent message, plus the pending-server-message predicate
//! and the capability-gated connection-settings mutators. Every reducer
//! no-ops on a `None` argument (spec §8 invariant: "any sequence of reducer
//! calls with nil arguments, the Agent is bit-identical before and after").

use chrono::{DateTime, Utc};
use commander_common::Hash;

use super::{
    component_health::{AvailableComponents, ComponentHealth},
    metadata::AgentDescription,
    status::{ConfigFile, EffectiveConfig, HashedApplyStatus, PackageStatus},
    Agent,
};
use crate::{
    capabilities::Capabilities,
    condition::{ConditionStatus, ConditionType},
    connection::ConnectionType,
    connection_info::ConnectionSettings,
    error::CoreError,
    remote_config::RemoteConfigStatus,
};

/// Agent-reported outcome for a remote config or connection-settings offer
/// (spec §3 "remoteConfigStatus", "connectionSettingsStatus").
#[derive(Debug, Clone)]
pub struct ReportedApplyStatus {
    pub hash: Hash,
    pub status: RemoteConfigStatus,
    pub error_message: Option<String>,
}

impl Agent {
    pub fn report_description(&mut self, description: Option<AgentDescription>) {
        if let Some(description) = description {
            self.metadata.description = description;
        }
    }

    /// Replaces `status.componentHealth` and derives the Healthy condition
    /// from the reported tree's recursive health (spec §4.1).
    pub fn report_component_health(&mut self, health: Option<ComponentHealth>, now: DateTime<Utc>) {
        let Some(health) = health else { return };
        let healthy = health.is_healthy_recursive();
        self.status.component_health = health;
        if healthy {
            self.mark_healthy("agent", now);
        } else {
            self.mark_unhealthy("agent", "component reported unhealthy", now);
        }
    }

    pub fn report_effective_config(&mut self, config: Option<EffectiveConfig>) {
        if let Some(config) = config {
            self.status.effective_config = config;
        }
    }

    /// Records the hash of the remote config command the server dispatched
    /// to the agent, independent of whatever the agent later reports — the
    /// spec's "last offered hash" (spec §4.1) is the server's offer, not the
    /// agent's own prior status, so it has to be tracked separately from
    /// `status.remoteConfigStatus.lastRemoteConfigHash` (which
    /// `report_remote_config_status` overwrites on every call). Mirrors
    /// `RemoteConfig::mark_offered` in remote_config.rs.
    pub fn mark_remote_config_offered(&mut self, hash: Hash, _now: DateTime<Utc>) {
        self.status.remote_config_offered_hash = Some(hash);
        tracing::debug!(instance_uid = %self.instance_uid(), %hash, "remote config offered to agent");
    }

    /// Replaces `status.remoteConfigStatus`; if the reported hash matches
    /// the last offered hash and the agent reports `Applied`, the Configured
    /// condition transitions True (spec §4.1).
    pub fn report_remote_config_status(
        &mut self,
        reported: Option<ReportedApplyStatus>,
        now: DateTime<Utc>,
    ) {
        let Some(reported) = reported else { return };
        let offered_hash = self.status.remote_config_offered_hash;

        self.status.remote_config_status = HashedApplyStatus {
            last_hash: Some(reported.hash),
            status: Some(reported.status),
            error_message: reported.error_message,
            last_updated_at: Some(now),
        };

        if reported.status == RemoteConfigStatus::Applied && offered_hash == Some(reported.hash) {
            self.mark_configured("agent", now);
        }
    }

    pub fn report_connection_settings_status(
        &mut self,
        reported: Option<ReportedApplyStatus>,
        now: DateTime<Utc>,
    ) {
        let Some(reported) = reported else { return };
        self.status.connection_settings_status = HashedApplyStatus {
            last_hash: Some(reported.hash),
            status: Some(reported.status),
            error_message: reported.error_message,
            last_updated_at: Some(now),
        };
    }

    pub fn report_package_statuses(&mut self, statuses: Option<Vec<PackageStatus>>) {
        if let Some(statuses) = statuses {
            self.status.package_statuses = statuses;
        }
    }

    pub fn report_custom_capabilities(&mut self, capabilities: Option<Vec<String>>) {
        if let Some(capabilities) = capabilities {
            self.metadata.custom_capabilities = capabilities;
        }
    }

    pub fn report_available_components(&mut self, components: Option<AvailableComponents>) {
        if let Some(components) = components {
            self.status.available_components = components;
        }
    }

    pub fn record_last_reported(&mut self, server: String, now: DateTime<Utc>, sequence_num: u64) {
        self.status.last_reported_to = Some(server);
        self.status.last_reported_at = Some(now);
        self.status.sequence_num = sequence_num;
    }

    pub fn update_last_communication_info(
        &mut self,
        now: DateTime<Utc>,
        connection_type: Option<ConnectionType>,
    ) {
        self.status.connected = true;
        self.status.last_reported_at = Some(now);
        self.status.connection_type = connection_type.unwrap_or(ConnectionType::Unknown);
    }

    pub fn mark_connected(&mut self, now: DateTime<Utc>) {
        self.status.connected = true;
        self.status
            .conditions
            .set(ConditionType::Connected, ConditionStatus::True, "Connected", "", now);
        tracing::debug!(instance_uid = %self.instance_uid(), "agent connected");
    }

    pub fn mark_disconnected(&mut self, triggered_by: &str, now: DateTime<Utc>) {
        self.status.connected = false;
        self.status.conditions.set(
            ConditionType::Connected,
            ConditionStatus::False,
            "Disconnected",
            triggered_by,
            now,
        );
        tracing::debug!(instance_uid = %self.instance_uid(), triggered_by, "agent disconnected");
    }

    pub fn mark_healthy(&mut self, by: &str, now: DateTime<Utc>) {
        self.status.conditions.set(
            ConditionType::Healthy,
            ConditionStatus::True,
            "Healthy",
            by,
            now,
        );
    }

    pub fn mark_unhealthy(&mut self, by: &str, reason: &str, now: DateTime<Utc>) {
        self.status.conditions.set(
            ConditionType::Healthy,
            ConditionStatus::False,
            reason,
            by,
            now,
        );
    }

    pub fn mark_configured(&mut self, by: &str, now: DateTime<Utc>) {
        self.status.conditions.set(
            ConditionType::Configured,
            ConditionStatus::True,
            "Configured",
            by,
            now,
        );
    }

    pub fn mark_registered(&mut self, now: DateTime<Utc>) {
        self.status.conditions.set(
            ConditionType::Registered,
            ConditionStatus::True,
            "Registered",
            "server",
            now,
        );
    }

    /// `NeedFullStateCommand()` (spec §4.1): no pending rename AND metadata
    /// complete means the agent is already fully known.
    pub fn need_full_state_command(&self) -> bool {
        self.spec.new_instance_uid.is_none() || !self.metadata.is_complete()
    }

    /// `HasRemoteConfig()` (spec §4.1).
    pub fn has_remote_config(&self) -> bool {
        self.metadata.capabilities.has_accepts_remote_config() && !self.spec.remote_config.is_empty()
    }

    /// `ShouldBeRestarted()` (spec §4.1).
    pub fn should_be_restarted(&self) -> bool {
        match (
            self.spec.restart_info.required_restarted_at,
            self.status.component_health.start_time,
        ) {
            (Some(required), Some(started)) => required > started,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// `HasPendingServerMessages()` (spec §4.1).
    pub fn has_pending_server_messages(&self) -> bool {
        self.need_full_state_command() || self.has_remote_config() || self.should_be_restarted()
    }

    /// Connection-settings mutators gate on capability bits; attempting one
    /// the agent's bitset disallows fails with `UnsupportedAgentOperation`
    /// (spec §4.1).
    pub fn set_opamp_connection_settings(
        &mut self,
        settings: Option<ConnectionSettings>,
    ) -> Result<(), CoreError> {
        self.require_capability(Capabilities::ACCEPTS_OPAMP_CONNECTION_SETTINGS, "set_opamp_connection_settings")?;
        self.spec.connection_info.set_opamp(settings);
        Ok(())
    }

    pub fn set_other_connection_settings(
        &mut self,
        name: impl Into<String>,
        settings: ConnectionSettings,
    ) -> Result<(), CoreError> {
        self.require_capability(
            Capabilities::ACCEPTS_OTHER_CONNECTION_SETTINGS,
            "set_other_connection_settings",
        )?;
        self.spec.connection_info.set_other_connection(name, settings);
        Ok(())
    }

    pub fn request_restart(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.require_capability(Capabilities::ACCEPTS_RESTART_COMMAND, "request_restart")?;
        self.spec.restart_info.required_restarted_at = Some(now);
        Ok(())
    }

    fn require_capability(&self, capability: Capabilities, operation: &'static str) -> Result<(), CoreError> {
        if self.metadata.capabilities.contains(capability) {
            Ok(())
        } else {
            tracing::warn!(instance_uid = %self.instance_uid(), operation, "rejected operation: capability not declared");
            Err(CoreError::UnsupportedAgentOperation {
                instance_uid: self.instance_uid(),
                operation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn t(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn nil_reducer_calls_are_no_ops() {
        let mut agent = Agent::new(Uuid::nil());
        let before = serde_json::to_value(&agent).unwrap();

        agent.report_description(None);
        agent.report_effective_config(None);
        agent.report_remote_config_status(None, t(1));
        agent.report_connection_settings_status(None, t(1));
        agent.report_package_statuses(None);
        agent.report_custom_capabilities(None);
        agent.report_available_components(None);
        agent.report_component_health(None, t(1));

        let after = serde_json::to_value(&agent).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn unsupported_operation_fails_without_capability() {
        let mut agent = Agent::new(Uuid::nil());
        let err = agent.set_opamp_connection_settings(None).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedAgentOperation { .. }));
    }

    #[test]
    fn capability_gated_mutation_succeeds_when_declared() {
        let mut agent = Agent::new(Uuid::nil());
        agent.metadata.capabilities = Capabilities::ACCEPTS_OPAMP_CONNECTION_SETTINGS;
        assert!(agent.set_opamp_connection_settings(None).is_ok());
    }

    #[test]
    fn applied_status_matching_offered_hash_marks_configured_in_one_report() {
        let mut agent = Agent::new(Uuid::nil());
        let hash = Hash::of_bytes(b"cfg");
        // The server offers the hash once (not a report from the agent);
        // a single subsequent Applied report for that same hash is enough
        // to flip Configured to True.
        agent.mark_remote_config_offered(hash, t(1));
        agent.report_remote_config_status(
            Some(ReportedApplyStatus {
                hash,
                status: RemoteConfigStatus::Applied,
                error_message: None,
            }),
            t(2),
        );
        assert!(agent.status.conditions.is_true(ConditionType::Configured));
    }

    #[test]
    fn applied_status_without_a_matching_offer_does_not_mark_configured() {
        let mut agent = Agent::new(Uuid::nil());
        let hash = Hash::of_bytes(b"cfg");
        // No offer was ever recorded, so even an Applied report must not
        // flip Configured — this is the regression the offered-hash field
        // guards against (a fresh Agent's `remote_config_offered_hash` is
        // `None`, which must never accidentally equal a reported hash).
        agent.report_remote_config_status(
            Some(ReportedApplyStatus {
                hash,
                status: RemoteConfigStatus::Applied,
                error_message: None,
            }),
            t(1),
        );
        assert!(!agent.status.conditions.is_true(ConditionType::Configured));
    }

    #[test]
    fn need_full_state_command_true_when_instance_uid_not_renamed() {
        let agent = Agent::new(Uuid::nil());
        assert!(agent.need_full_state_command());
    }

    #[test]
    fn pending_server_messages_true_when_remote_config_pending() {
        let mut agent = Agent::new(Uuid::nil());
        agent.spec.new_instance_uid = Some(Uuid::nil());
        agent
            .metadata
            .description
            .identifying_attributes
            .insert("service.name", "svc");
        agent.metadata.capabilities =
            Capabilities::REPORTS_STATUS | Capabilities::ACCEPTS_REMOTE_CONFIG;
        agent.spec.remote_config.set(vec!["cfg1".into()]);
        assert!(agent.has_pending_server_messages());
    }
}
