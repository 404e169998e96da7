//! `AgentGroup` persistence binding (spec §6: indexed by `name`).

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use commander_common::db::{document::DocumentMapping, ResourceMapping};

use super::entity::EntityEnvelope;
use crate::agent_group::AgentGroup;

type AgentGroupEntity = EntityEnvelope<AgentGroup>;

pub struct AgentGroupMapping;

impl ResourceMapping for AgentGroupMapping {
    type Domain = AgentGroup;
    type Entity = AgentGroupEntity;
    const RESOURCE_NAME: &'static str = "agentgroups";

    fn key(domain: &Self::Domain) -> String {
        domain.metadata.name.clone()
    }

    fn to_entity(domain: &Self::Domain) -> Self::Entity {
        EntityEnvelope::wrap(domain.clone())
    }

    fn to_domain(entity: Self::Entity) -> Self::Domain {
        entity.payload
    }
}

impl DocumentMapping for AgentGroupMapping {
    fn key_filter(key: &str) -> Document {
        doc! { "metadata.name": key }
    }

    fn object_id(entity: &Self::Entity) -> Option<ObjectId> {
        entity.id
    }

    fn deleted_at(entity: &Self::Entity) -> Option<DateTime<Utc>> {
        entity.payload.deleted_at()
    }

    // AgentGroup is never queried via `ListBySelector` over its own
    // `selector` field (only Agents are, spec §6) so the default
    // identifying/non-identifying attribute paths are left unused here.
}
