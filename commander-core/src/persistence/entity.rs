//! The versioned wire/storage envelope every resource is persisted as (spec
//! §6 "Values are canonical JSON of the versioned entity record (`version`
//! field ... precedes all payload fields to allow future schema
//! migration)").

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEnvelope<T> {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<bson::oid::ObjectId>,
    pub version: u32,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> EntityEnvelope<T> {
    pub fn wrap(payload: T) -> Self {
        Self {
            id: None,
            version: CURRENT_VERSION,
            payload,
        }
    }
}
