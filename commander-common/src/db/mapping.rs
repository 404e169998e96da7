//! The `Entity<Domain>` polymorphism (spec §9 "polymorphism without
//! inheritance"): a [`ResourceMapping`] is a zero-sized marker type per
//! resource (Agent, AgentGroup, AgentRemoteConfigResource, ...) that pairs a
//! `to_entity`/`to_domain` function pair with a `key` function, so the
//! generic [`Adapter`] never needs to know anything about the domain type it
//! stores.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::{error::DatabaseError, pagination::ListOptions, pagination::ListResponse};

/// Describes how one domain aggregate is stored: its wire/storage
/// representation (`Entity`), the key it is addressed by, and the pure
/// conversion functions between the two. Implement this once per resource;
/// both backend bindings are generic over it.
pub trait ResourceMapping: Send + Sync + 'static {
    type Domain: Clone + Send + Sync + 'static;
    type Entity: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Name of the sorted-key prefix / document collection for this resource.
    const RESOURCE_NAME: &'static str;

    /// The resource's identifier, without any backend-specific prefix.
    fn key(domain: &Self::Domain) -> String;

    fn to_entity(domain: &Self::Domain) -> Self::Entity;
    fn to_domain(entity: Self::Entity) -> Self::Domain;
}

/// The generic CRUD facade (spec §4.4). Both the sorted-key and document
/// backend bindings implement this for any [`ResourceMapping`].
#[async_trait]
pub trait Adapter<M: ResourceMapping>: Send + Sync {
    async fn get(&self, key: &str) -> Result<M::Domain, DatabaseError>;
    async fn list(&self, options: ListOptions) -> Result<ListResponse<M::Domain>, DatabaseError>;
    async fn put(&self, domain: &M::Domain) -> Result<(), DatabaseError>;
}
