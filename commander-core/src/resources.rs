//! Auxiliary resources (spec §3: "AgentRemoteConfigResource, AgentPackage,
//! Certificate, Server — auxiliary resources sharing the `{metadata, spec,
//! status}` shape and soft-delete discipline"). The spec leaves their
//! payload fields unspecified beyond that shape, since none of them carry
//! domain logic of their own the way Agent/AgentGroup/RemoteConfig do — they
//! are CRUD resources the persistence layer stores and the outer server
//! surfaces, not state machines the core reduces over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! auxiliary_resource {
    ($name:ident, $spec:ident, $status:ident) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            pub metadata: AuxiliaryMetadata,
            pub spec: $spec,
            pub status: $status,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    metadata: AuxiliaryMetadata::new(name),
                    spec: $spec::default(),
                    status: $status::default(),
                }
            }

            pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
                self.metadata.deleted_at = Some(now);
            }

            pub fn is_deleted(&self) -> bool {
                self.metadata.deleted_at.is_some()
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxiliaryMetadata {
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuxiliaryMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPackageSpec {
    pub version: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPackageStatus {
    pub hash: Option<commander_common::Hash>,
}

auxiliary_resource!(AgentPackage, AgentPackageSpec, AgentPackageStatus);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateSpec {
    pub cert_pem: String,
    pub private_key_pem: String,
    pub ca_pem: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateStatus {
    pub not_after: Option<DateTime<Utc>>,
}

auxiliary_resource!(Certificate, CertificateSpec, CertificateStatus);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSpec {
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerStatus {
    pub last_seen_at: Option<DateTime<Utc>>,
}

auxiliary_resource!(Server, ServerSpec, ServerStatus);
