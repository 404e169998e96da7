//! The Agent aggregate (spec §3 "Agent", §4.1 "Agent reducers"): the root
//! object addressed by `instanceUID`, decomposed into `Metadata` (identity),
//! `Spec` (desired state) and `Status` (observed state).

pub mod component_health;
pub mod metadata;
pub mod reducers;
pub mod spec;
pub mod status;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use metadata::{AgentDescription, AgentMetadata};
pub use spec::{AgentSpec, PackageAvailable, RemoteConfigNames, RestartInfo};
pub use status::{AgentStatus, ConfigFile, EffectiveConfig, HashedApplyStatus, PackageStatus, PackageStatusValue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub metadata: AgentMetadata,
    pub spec: AgentSpec,
    pub status: AgentStatus,
}

impl Agent {
    /// `GetOrCreateAgent` (spec §3 "Lifecycles"): an Agent is created on
    /// first inbound message and never destroyed afterward.
    pub fn new(instance_uid: Uuid) -> Self {
        Self {
            metadata: AgentMetadata::new(instance_uid),
            spec: AgentSpec::default(),
            status: AgentStatus::default(),
        }
    }

    pub fn instance_uid(&self) -> Uuid {
        self.metadata.instance_uid
    }
}
