//! `Agent` persistence binding (spec §6: indexed by `metadata.instanceUid`,
//! and by `metadata.description.identifyingAttributes.key/value` /
//! `.nonIdentifyingAttributes.key/value` for selector queries). The document
//! entity stores each attribute map as an array of `{key, value}` pairs
//! rather than the domain's `BTreeMap`, since Mongo can't usefully index a
//! map with dynamic field names but can index a fixed `{key, value}` shape.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use commander_common::db::{document::DocumentMapping, ResourceMapping};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::EntityEnvelope;
use crate::{
    agent::{Agent, AgentDescription, AgentMetadata},
    attributes::Attributes,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyValue {
    key: String,
    value: String,
}

fn attributes_to_pairs(attrs: &Attributes) -> Vec<KeyValue> {
    attrs
        .iter()
        .map(|(k, v)| KeyValue {
            key: k.to_owned(),
            value: v.to_owned(),
        })
        .collect()
}

fn pairs_to_attributes(pairs: Vec<KeyValue>) -> Attributes {
    Attributes::from_pairs(pairs.into_iter().map(|kv| (kv.key, kv.value)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AgentDescriptionEntity {
    identifying_attributes: Vec<KeyValue>,
    non_identifying_attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AgentMetadataEntity {
    /// Stored as a string rather than bson's native UUID subtype so the
    /// sorted-key (JSON) and document (BSON) bindings share one entity
    /// shape without a feature-gated `uuid` dependency on `bson`.
    instance_uid: String,
    description: AgentDescriptionEntity,
    capabilities: crate::capabilities::Capabilities,
    custom_capabilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AgentPayload {
    metadata: AgentMetadataEntity,
    spec: crate::agent::AgentSpec,
    status: crate::agent::AgentStatus,
}

type AgentEntity = EntityEnvelope<AgentPayload>;

fn deleted_at_placeholder() -> Option<DateTime<Utc>> {
    // Agent has no soft-delete marker of its own (spec §3 "Lifecycles": "an
    // Agent is never destroyed, only evolved"); reads are never filtered.
    None
}

pub struct AgentMapping;

impl ResourceMapping for AgentMapping {
    type Domain = Agent;
    type Entity = AgentEntity;
    const RESOURCE_NAME: &'static str = "agents";

    fn key(domain: &Self::Domain) -> String {
        domain.metadata.instance_uid.to_string()
    }

    fn to_entity(domain: &Self::Domain) -> Self::Entity {
        EntityEnvelope::wrap(AgentPayload {
            metadata: AgentMetadataEntity {
                instance_uid: domain.metadata.instance_uid.to_string(),
                description: AgentDescriptionEntity {
                    identifying_attributes: attributes_to_pairs(
                        &domain.metadata.description.identifying_attributes,
                    ),
                    non_identifying_attributes: attributes_to_pairs(
                        &domain.metadata.description.non_identifying_attributes,
                    ),
                },
                capabilities: domain.metadata.capabilities,
                custom_capabilities: domain.metadata.custom_capabilities.clone(),
            },
            spec: domain.spec.clone(),
            status: domain.status.clone(),
        })
    }

    fn to_domain(entity: Self::Entity) -> Self::Domain {
        let payload = entity.payload;
        Agent {
            metadata: AgentMetadata {
                instance_uid: Uuid::parse_str(&payload.metadata.instance_uid)
                    .unwrap_or(Uuid::nil()),
                description: AgentDescription {
                    identifying_attributes: pairs_to_attributes(
                        payload.metadata.description.identifying_attributes,
                    ),
                    non_identifying_attributes: pairs_to_attributes(
                        payload.metadata.description.non_identifying_attributes,
                    ),
                },
                capabilities: payload.metadata.capabilities,
                custom_capabilities: payload.metadata.custom_capabilities,
            },
            spec: payload.spec,
            status: payload.status,
        }
    }
}

impl DocumentMapping for AgentMapping {
    fn key_filter(key: &str) -> Document {
        doc! { "metadata.instance_uid": key }
    }

    fn object_id(entity: &Self::Entity) -> Option<ObjectId> {
        entity.id
    }

    fn deleted_at(_entity: &Self::Entity) -> Option<DateTime<Utc>> {
        deleted_at_placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_entity_conversion() {
        let mut agent = Agent::new(Uuid::new_v4());
        agent
            .metadata
            .description
            .identifying_attributes
            .insert("service.name", "svc");
        agent.metadata.capabilities = crate::capabilities::Capabilities::REPORTS_STATUS;

        let entity = AgentMapping::to_entity(&agent);
        let round_tripped = AgentMapping::to_domain(entity);

        assert_eq!(round_tripped.metadata.instance_uid, agent.metadata.instance_uid);
        assert_eq!(
            round_tripped
                .metadata
                .description
                .identifying_attributes
                .get("service.name"),
            Some("svc")
        );
    }
}
