//! Agent metadata (spec §3 Agent "Metadata"): identity, attribute
//! description and capability bitset. Mutated wholesale only by
//! `ReportDescription`/`ReportCustomCapabilities` (spec §4.1) — there is no
//! field-level setter, since partial updates aren't part of the OpAMP wire
//! contract this mirrors.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{attributes::Attributes, capabilities::Capabilities};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescription {
    pub identifying_attributes: Attributes,
    pub non_identifying_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub instance_uid: Uuid,
    pub description: AgentDescription,
    pub capabilities: Capabilities,
    pub custom_capabilities: Vec<String>,
}

impl AgentMetadata {
    pub fn new(instance_uid: Uuid) -> Self {
        Self {
            instance_uid,
            description: AgentDescription::default(),
            capabilities: Capabilities::default(),
            custom_capabilities: Vec::new(),
        }
    }

    /// `description has >= 1 attribute AND capabilities != 0` (spec §3, §8
    /// invariant).
    pub fn is_complete(&self) -> bool {
        let attribute_count = self.description.identifying_attributes.len()
            + self.description.non_identifying_attributes.len();
        attribute_count > 0 && !self.capabilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_without_attributes_or_capabilities() {
        let meta = AgentMetadata::new(Uuid::nil());
        assert!(!meta.is_complete());
    }

    #[test]
    fn complete_with_one_attribute_and_nonzero_capabilities() {
        let mut meta = AgentMetadata::new(Uuid::nil());
        meta.description
            .identifying_attributes
            .insert("service.name", "svc");
        meta.capabilities = Capabilities::REPORTS_STATUS;
        assert!(meta.is_complete());
    }

    #[test]
    fn attributes_without_capabilities_is_incomplete() {
        let mut meta = AgentMetadata::new(Uuid::nil());
        meta.description
            .identifying_attributes
            .insert("service.name", "svc");
        assert!(!meta.is_complete());
    }
}
