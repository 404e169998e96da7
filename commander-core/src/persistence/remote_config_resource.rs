//! `AgentRemoteConfigResource` persistence binding (spec §6: one collection
//! per auxiliary resource, indexed by `name`).

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use commander_common::db::{document::DocumentMapping, ResourceMapping};

use super::entity::EntityEnvelope;
use crate::remote_config::AgentRemoteConfigResource;

type RemoteConfigEntity = EntityEnvelope<AgentRemoteConfigResource>;

pub struct AgentRemoteConfigResourceMapping;

impl ResourceMapping for AgentRemoteConfigResourceMapping {
    type Domain = AgentRemoteConfigResource;
    type Entity = RemoteConfigEntity;
    const RESOURCE_NAME: &'static str = "agentremoteconfigs";

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

impl DocumentMapping for AgentRemoteConfigResourceMapping {
    fn key_filter(key: &str) -> Document {
        doc! { "metadata.name": key }
    }

    fn object_id(entity: &Self::Entity) -> Option<ObjectId> {
        entity.id
    }

    fn deleted_at(entity: &Self::Entity) -> Option<DateTime<Utc>> {
        entity.payload.metadata.deleted_at
    }
}
