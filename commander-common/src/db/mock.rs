//! In-memory stand-ins for the two backend bindings (spec §4.12): ground
//! property tests for pagination and soft-delete behaviour against the same
//! [`Adapter`] trait `SortedAdapter`/`DocumentAdapter` satisfy, without
//! standing up a `sled` tree or a `mongodb` instance. Plays the role the
//! teacher's workspace gives `mockall`/`httpmock` for network collaborators —
//! here the collaborator being stood in for is a database.
//!
//! Entities are round-tripped through `serde_json` bytes on every read
//! rather than kept as live `M::Entity` values, since [`ResourceMapping`]
//! doesn't require `Entity: Clone` — the same reason `SortedAdapter` encodes
//! to bytes instead of cloning.
//!
//! Only compiled for test code (`#[cfg(test)]` in this crate, or the
//! `test-support` feature for downstream crates that want the same fixtures).

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use chrono::{DateTime, Utc};

use super::{
    document::DocumentMapping,
    error::DatabaseError,
    mapping::{Adapter, ResourceMapping},
    pagination::{ListOptions, ListResponse},
};

fn encode<M: ResourceMapping>(domain: &M::Domain) -> Result<Vec<u8>, DatabaseError> {
    let entity = M::to_entity(domain);
    serde_json::to_vec(&entity).map_err(|source| DatabaseError::Encode {
        collection: M::RESOURCE_NAME.to_owned(),
        source,
    })
}

fn decode<M: ResourceMapping>(key: &str, bytes: &[u8]) -> Result<M::Domain, DatabaseError> {
    let entity: M::Entity = serde_json::from_slice(bytes).map_err(|source| DatabaseError::Decode {
        key: key.to_owned(),
        collection: M::RESOURCE_NAME.to_owned(),
        source,
    })?;
    Ok(M::to_domain(entity))
}

/// In-memory equivalent of [`super::sorted::SortedAdapter`]: a lexicographically
/// ordered map keyed by the bare resource id, with the same successor-key
/// continue-token scheme.
pub struct MockSortedAdapter<M: ResourceMapping> {
    rows: Mutex<BTreeMap<String, Vec<u8>>>,
    _marker: std::marker::PhantomData<M>,
}

impl<M: ResourceMapping> Default for MockSortedAdapter<M> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<M: ResourceMapping> MockSortedAdapter<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl<M: ResourceMapping> Adapter<M> for MockSortedAdapter<M> {
    async fn get(&self, key: &str) -> Result<M::Domain, DatabaseError> {
        let rows = self.rows.lock().expect("mock adapter mutex poisoned");
        let bytes = rows.get(key).ok_or_else(|| DatabaseError::NotFound(key.to_owned()))?;
        decode::<M>(key, bytes)
    }

    async fn list(&self, options: ListOptions) -> Result<ListResponse<M::Domain>, DatabaseError> {
        let rows = self.rows.lock().expect("mock adapter mutex poisoned");
        let mut items = Vec::new();
        let mut last_key: Option<String> = None;
        let mut has_more = false;

        for (scanned, (key, bytes)) in rows.range(options.r#continue.clone()..).enumerate() {
            if options.limit > 0 && scanned as i64 >= options.limit {
                has_more = true;
                break;
            }
            items.push(decode::<M>(key, bytes)?);
            last_key = Some(key.clone());
        }

        let continue_token = if has_more {
            last_key.map(|k| format!("{k}\0")).unwrap_or_default()
        } else {
            String::new()
        };

        Ok(ListResponse {
            items,
            r#continue: continue_token,
            remaining_item_count: -1,
        })
    }

    async fn put(&self, domain: &M::Domain) -> Result<(), DatabaseError> {
        let bytes = encode::<M>(domain)?;
        let mut rows = self.rows.lock().expect("mock adapter mutex poisoned");
        rows.insert(M::key(domain), bytes);
        Ok(())
    }
}

/// In-memory equivalent of [`super::document::DocumentAdapter`]: an
/// insertion-ordered map keyed by a monotonic counter standing in for
/// `ObjectId`, honouring the same not-deleted filter on reads.
pub struct MockDocumentAdapter<M: DocumentMapping> {
    rows: Mutex<BTreeMap<u64, Vec<u8>>>,
    next_id: AtomicU64,
    _marker: std::marker::PhantomData<M>,
}

impl<M: DocumentMapping> Default for MockDocumentAdapter<M> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<M: DocumentMapping> MockDocumentAdapter<M> {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_live(bytes: &[u8]) -> Result<bool, DatabaseError> {
        let entity: M::Entity = serde_json::from_slice(bytes).map_err(|source| DatabaseError::Decode {
            key: String::new(),
            collection: M::RESOURCE_NAME.to_owned(),
            source,
        })?;
        Ok(M::deleted_at(&entity).is_none())
    }
}

#[async_trait::async_trait]
impl<M: DocumentMapping> Adapter<M> for MockDocumentAdapter<M> {
    async fn get(&self, key: &str) -> Result<M::Domain, DatabaseError> {
        let rows = self.rows.lock().expect("mock adapter mutex poisoned");
        let mut matches = Vec::new();
        for bytes in rows.values() {
            let domain = decode::<M>(key, bytes)?;
            if M::key(&domain) == key && Self::is_live(bytes)? {
                matches.push(domain);
            }
        }

        match matches.len() {
            0 => Err(DatabaseError::NotFound(key.to_owned())),
            1 => Ok(matches.into_iter().next().unwrap()),
            _ => Err(DatabaseError::MultipleExist(key.to_owned())),
        }
    }

    async fn list(&self, options: ListOptions) -> Result<ListResponse<M::Domain>, DatabaseError> {
        let rows = self.rows.lock().expect("mock adapter mutex poisoned");
        let start: u64 = if options.r#continue.is_empty() {
            0
        } else {
            options
                .r#continue
                .parse()
                .map_err(|_| DatabaseError::InvalidContinueToken(options.r#continue.clone()))?
        };

        let mut live: Vec<(u64, Vec<u8>)> = Vec::new();
        for (id, bytes) in rows.range(start + 1..) {
            if Self::is_live(bytes)? {
                live.push((*id, bytes.clone()));
            }
        }

        let total = live.len();
        let taken = if options.limit > 0 {
            (options.limit as usize).min(total)
        } else {
            total
        };

        let mut items = Vec::with_capacity(taken);
        for (id, bytes) in &live[..taken] {
            items.push(decode::<M>(&id.to_string(), bytes)?);
        }

        let continue_token = if items.len() < total {
            live.get(taken.saturating_sub(1))
                .map(|(id, _)| id.to_string())
                .unwrap_or_default()
        } else {
            String::new()
        };

        let remaining_item_count = if continue_token.is_empty() {
            0
        } else {
            (total - items.len()) as i64
        };

        Ok(ListResponse {
            items,
            r#continue: continue_token,
            remaining_item_count,
        })
    }

    async fn put(&self, domain: &M::Domain) -> Result<(), DatabaseError> {
        let key = M::key(domain);
        let bytes = encode::<M>(domain)?;
        let mut rows = self.rows.lock().expect("mock adapter mutex poisoned");

        let existing_id = {
            let mut found = None;
            for (id, existing_bytes) in rows.iter() {
                let existing_domain = decode::<M>(&key, existing_bytes)?;
                if M::key(&existing_domain) == key {
                    found = Some(*id);
                    break;
                }
            }
            found
        };

        match existing_id {
            Some(id) => {
                rows.insert(id, bytes);
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                rows.insert(id, bytes);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        deleted_at: Option<DateTime<Utc>>,
    }

    struct WidgetMapping;
    impl ResourceMapping for WidgetMapping {
        type Domain = Widget;
        type Entity = Widget;
        const RESOURCE_NAME: &'static str = "widgets";

        fn key(domain: &Self::Domain) -> String {
            domain.id.clone()
        }
        fn to_entity(domain: &Self::Domain) -> Self::Entity {
            domain.clone()
        }
        fn to_domain(entity: Self::Entity) -> Self::Domain {
            entity
        }
    }

    impl DocumentMapping for WidgetMapping {
        fn key_filter(key: &str) -> bson::Document {
            bson::doc! { "id": key }
        }
        fn object_id(_entity: &Self::Entity) -> Option<bson::oid::ObjectId> {
            None
        }
        fn deleted_at(entity: &Self::Entity) -> Option<DateTime<Utc>> {
            entity.deleted_at
        }
    }

    #[tokio::test]
    async fn sorted_mock_paginates_every_item_exactly_once() {
        let adapter = MockSortedAdapter::<WidgetMapping>::new();
        for i in 0..5 {
            adapter
                .put(&Widget {
                    id: format!("w{i}"),
                    deleted_at: None,
                })
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut token = String::new();
        loop {
            let page = adapter
                .list(ListOptions::new(2).with_continue(token.clone()))
                .await
                .unwrap();
            seen.extend(page.items.iter().map(|w| w.id.clone()));
            if page.is_last_page() {
                break;
            }
            token = page.r#continue;
        }
        seen.sort();
        assert_eq!(seen, vec!["w0", "w1", "w2", "w3", "w4"]);
    }

    #[tokio::test]
    async fn document_mock_hides_soft_deleted_rows() {
        let adapter = MockDocumentAdapter::<WidgetMapping>::new();
        adapter
            .put(&Widget {
                id: "alive".into(),
                deleted_at: None,
            })
            .await
            .unwrap();
        adapter
            .put(&Widget {
                id: "gone".into(),
                deleted_at: Some(Utc::now() - Duration::seconds(1)),
            })
            .await
            .unwrap();

        let page = adapter.list(ListOptions::new(0)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "alive");

        assert!(adapter.get("gone").await.is_err());
        assert!(adapter.get("alive").await.is_ok());
    }

    #[tokio::test]
    async fn document_mock_put_is_idempotent_upsert() {
        let adapter = MockDocumentAdapter::<WidgetMapping>::new();
        adapter
            .put(&Widget {
                id: "w1".into(),
                deleted_at: None,
            })
            .await
            .unwrap();
        adapter
            .put(&Widget {
                id: "w1".into(),
                deleted_at: None,
            })
            .await
            .unwrap();

        let page = adapter.list(ListOptions::new(0)).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }
}
