//! Persistence bindings for the remaining auxiliary resources (spec §6):
//! `AgentPackage`, `Certificate`, `Server`. All three share
//! [`crate::resources::AuxiliaryMetadata`]'s `{name, deletedAt}` shape, so
//! one macro instantiates `ResourceMapping`/`DocumentMapping` per type
//! rather than hand-duplicating three near-identical impls.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use commander_common::db::{document::DocumentMapping, ResourceMapping};

use super::entity::EntityEnvelope;
use crate::resources::{AgentPackage, Certificate, Server};

macro_rules! auxiliary_mapping {
    ($mapping:ident, $domain:ty, $resource_name:literal) => {
        pub struct $mapping;

        impl ResourceMapping for $mapping {
            type Domain = $domain;
            type Entity = EntityEnvelope<$domain>;
            const RESOURCE_NAME: &'static str = $resource_name;

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

        impl DocumentMapping for $mapping {
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
    };
}

auxiliary_mapping!(AgentPackageMapping, AgentPackage, "agentpackages");
auxiliary_mapping!(CertificateMapping, Certificate, "certificates");
auxiliary_mapping!(ServerMapping, Server, "servers");
