//! External interface contracts (spec §6): the inbound OpAMP usecase port.
//! These are Rust traits with no default HTTP/CLI wiring — an embedding
//! server binary supplies the implementation, consistent with "DI glue is
//! out of scope" (spec §1). The outbound persistence port is the generic
//! [`commander_common::db::Adapter`] plus
//! [`crate::agent_group::AgentLookup`] (for `ListBySelector`); the outbound
//! event-bus port is [`commander_common::events::EventBus`]. Both are
//! reused as-is rather than re-wrapped here.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    agent::{
        component_health::{AvailableComponents, ComponentHealth},
        reducers::ReportedApplyStatus,
        status::PackageStatus,
        AgentDescription, EffectiveConfig,
    },
    connection::ServerToAgent,
    error::CoreError,
};

/// An opaque inbound OpAMP message (spec §6: "opaque record containing
/// instanceUid, agentDescription, health, effectiveConfig,
/// remoteConfigStatus, packageStatuses, customCapabilities,
/// availableComponents"). Protobuf decoding lives in the embedding server;
/// by the time a message reaches this port it's already this shape.
#[derive(Debug, Clone)]
pub struct AgentToServer {
    pub instance_uid: Uuid,
    pub agent_description: Option<AgentDescription>,
    pub health: Option<ComponentHealth>,
    pub effective_config: Option<EffectiveConfig>,
    pub remote_config_status: Option<ReportedApplyStatus>,
    pub package_statuses: Option<Vec<PackageStatus>>,
    pub custom_capabilities: Option<Vec<String>>,
    pub available_components: Option<AvailableComponents>,
}

/// Inbound port (spec §6 "Inbound port: OpAMP usecase").
#[async_trait]
pub trait OpampUsecase: Send + Sync {
    async fn handle_agent_to_server(&self, msg: AgentToServer) -> Result<(), CoreError>;

    /// Blocking pull for HTTP polling (spec §6).
    async fn fetch_server_to_agent(&self, instance_uid: Uuid) -> Result<ServerToAgent, CoreError>;

    /// Idempotent; an absent connection is success (spec §6).
    async fn disconnect_agent(&self, instance_uid: Uuid) -> Result<(), CoreError>;
}
