//! Agent observed state (spec §3 Agent "Status"): mutated only by reducers
//! reacting to inbound agent messages (spec §4.1), never directly by an
//! operator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use commander_common::Hash;
use serde::{Deserialize, Serialize};

use super::component_health::{AvailableComponents, ComponentHealth};
use crate::{
    condition::Conditions, connection::ConnectionType, remote_config::RemoteConfigStatus,
};

/// Shared shape for `remoteConfigStatus` and `connectionSettingsStatus`
/// (spec §3: "connectionSettingsStatus (same shape)"). Reuses
/// [`RemoteConfigStatus`] as the status enum since the two records really
/// are identical but for which hash they track.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashedApplyStatus {
    pub last_hash: Option<Hash>,
    pub status: Option<RemoteConfigStatus>,
    pub error_message: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub config_map: BTreeMap<String, ConfigFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatusValue {
    Installed,
    InstallPending,
    Installing,
    InstallFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStatus {
    pub name: String,
    pub status: PackageStatusValue,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentStatus {
    pub remote_config_status: HashedApplyStatus,
    /// The hash of the remote config command the server most recently
    /// dispatched to the agent, set by `Agent::mark_remote_config_offered`
    /// when the server sends the offer — distinct from
    /// `remote_config_status.last_hash`, which is whatever the agent itself
    /// last reported (spec §4.1: "the last offered hash").
    pub remote_config_offered_hash: Option<Hash>,
    pub connection_settings_status: HashedApplyStatus,
    pub effective_config: EffectiveConfig,
    pub package_statuses: Vec<PackageStatus>,
    pub component_health: ComponentHealth,
    pub available_components: AvailableComponents,
    pub conditions: Conditions,
    pub connected: bool,
    pub connection_type: ConnectionType,
    pub sequence_num: u64,
    pub last_reported_at: Option<DateTime<Utc>>,
    pub last_reported_to: Option<String>,
}
