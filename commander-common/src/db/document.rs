//! Document backend binding (spec §4.5 "Document backend", §4.6 "Soft delete
//! and selector filtering"). Maps the generic [`Adapter`] onto a MongoDB
//! collection, translates [`Selector`]s into `$elemMatch` filters, filters
//! soft-deleted documents out of reads, and paginates on a monotonic
//! `ObjectId` continue token with a parallel count query for
//! `remaining_item_count`.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::Collection;

use super::{
    error::DatabaseError,
    mapping::{Adapter, ResourceMapping},
    pagination::{ListOptions, ListResponse},
    selector::Selector,
};

/// Extends [`ResourceMapping`] with the bits the document backend needs: how
/// to filter by key, where the soft-delete marker lives, and which fields a
/// selector query matches against.
pub trait DocumentMapping: ResourceMapping {
    /// Translate a bare resource key into the Mongo filter that selects its
    /// document, e.g. `{"metadata.instance_uid": key}` for Agent or
    /// `{"name": key}` for AgentGroup.
    fn key_filter(key: &str) -> Document;

    fn object_id(entity: &Self::Entity) -> Option<ObjectId>;
    fn deleted_at(entity: &Self::Entity) -> Option<DateTime<Utc>>;

    /// Dotted path to the array of `{key, value}` documents identifying the
    /// resource (e.g. `metadata.description.identifying_attributes`).
    fn identifying_attributes_path() -> &'static str {
        "metadata.description.identifying_attributes"
    }

    /// Dotted path to the array of `{key, value}` documents that are
    /// non-identifying.
    fn non_identifying_attributes_path() -> &'static str {
        "metadata.description.non_identifying_attributes"
    }
}

pub struct DocumentAdapter<M: DocumentMapping> {
    collection: Collection<M::Entity>,
}

impl<M: DocumentMapping> DocumentAdapter<M> {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            collection: database.collection::<M::Entity>(M::RESOURCE_NAME),
        }
    }

    fn not_deleted_filter() -> Document {
        doc! { "metadata.deleted_at": { "$eq": bson::Bson::Null } }
    }

    /// Selector-based query used by `AgentGroup` statistics rollup and the
    /// `ListBySelector` outbound port (spec §4.2, §6).
    pub async fn list_by_selector(
        &self,
        selector: &Selector,
    ) -> Result<Vec<M::Domain>, DatabaseError> {
        let mut filter = Self::not_deleted_filter();
        for clause in selector_to_match_conditions::<M>(selector) {
            merge_and(&mut filter, clause);
        }

        let mut cursor = self
            .collection
            .find(filter)
            .await
            .map_err(|source| document_err("list_by_selector", source))?;

        let mut out = Vec::new();
        while let Some(entity) = cursor
            .try_next()
            .await
            .map_err(|source| document_err("list_by_selector", source))?
        {
            out.push(M::to_domain(entity));
        }
        Ok(out)
    }
}

fn document_err(operation: &str, source: mongodb::error::Error) -> DatabaseError {
    DatabaseError::Document {
        operation: operation.to_owned(),
        source,
    }
}

fn merge_and(filter: &mut Document, clause: Document) {
    let existing = filter.remove("$and");
    let mut clauses = match existing {
        Some(bson::Bson::Array(arr)) => arr,
        _ => Vec::new(),
    };
    clauses.push(bson::Bson::Document(clause));
    filter.insert("$and", clauses);
}

/// `SelectorToMatchConditions` (spec §4.6): one `$elemMatch` clause per
/// identifying-attribute pair and one per non-identifying pair, ANDed
/// together. An empty selector yields no clauses, matching everything.
pub fn selector_to_match_conditions<M: DocumentMapping>(selector: &Selector) -> Vec<Document> {
    let mut clauses = Vec::new();
    for (key, value) in &selector.identifying {
        clauses.push(doc! {
            M::identifying_attributes_path(): {
                "$elemMatch": { "key": key, "value": value }
            }
        });
    }
    for (key, value) in &selector.non_identifying {
        clauses.push(doc! {
            M::non_identifying_attributes_path(): {
                "$elemMatch": { "key": key, "value": value }
            }
        });
    }
    clauses
}

#[async_trait::async_trait]
impl<M: DocumentMapping> Adapter<M> for DocumentAdapter<M> {
    async fn get(&self, key: &str) -> Result<M::Domain, DatabaseError> {
        let mut filter = Self::not_deleted_filter();
        merge_and(&mut filter, M::key_filter(key));

        let mut cursor = self
            .collection
            .find(filter)
            .await
            .map_err(|source| document_err("get", source))?;

        let first = cursor
            .try_next()
            .await
            .map_err(|source| document_err("get", source))?
            .ok_or_else(|| DatabaseError::NotFound(key.to_owned()))?;

        if cursor
            .try_next()
            .await
            .map_err(|source| document_err("get", source))?
            .is_some()
        {
            return Err(DatabaseError::MultipleExist(key.to_owned()));
        }

        Ok(M::to_domain(first))
    }

    async fn list(&self, options: ListOptions) -> Result<ListResponse<M::Domain>, DatabaseError> {
        let mut filter = Self::not_deleted_filter();

        if !options.r#continue.is_empty() {
            let oid = ObjectId::parse_str(&options.r#continue)
                .map_err(|_| DatabaseError::InvalidContinueToken(options.r#continue.clone()))?;
            filter.insert("_id", doc! { "$gt": oid });
        }

        let count_filter = filter.clone();
        let count_future = async {
            self.collection
                .count_documents(count_filter)
                .await
                .map_err(|source| document_err("list", source))
        };

        let find_future = async {
            let mut builder = self.collection.find(filter).sort(doc! { "_id": 1 });
            if options.limit > 0 {
                builder = builder.limit(options.limit);
            }
            let mut cursor = builder
                .await
                .map_err(|source| document_err("list", source))?;

            let mut items = Vec::new();
            let mut last_id = None;
            while let Some(entity) = cursor
                .try_next()
                .await
                .map_err(|source| document_err("list", source))?
            {
                last_id = M::object_id(&entity);
                items.push(M::to_domain(entity));
            }
            Ok::<_, DatabaseError>((items, last_id))
        };

        let (count, (items, last_id)) = tokio::try_join!(count_future, find_future)?;

        let continue_token = if options.limit > 0 && items.len() as i64 == options.limit {
            last_id.map(|id| id.to_hex()).unwrap_or_default()
        } else {
            String::new()
        };

        let remaining_item_count = if continue_token.is_empty() {
            0
        } else {
            (count as i64 - items.len() as i64).max(0)
        };

        Ok(ListResponse {
            items,
            r#continue: continue_token,
            remaining_item_count,
        })
    }

    /// Soft-deleted writes (`MarkDeleted` then `Put`) return the domain input
    /// directly rather than re-reading it back, since a subsequent `get`
    /// would filter the just-written document out (spec §4.6). That
    /// behaviour lives one level up, in `commander-core`'s usecase layer,
    /// since this adapter's `put` always performs the same idempotent
    /// upsert regardless of soft-delete state.
    async fn put(&self, domain: &M::Domain) -> Result<(), DatabaseError> {
        let entity = M::to_entity(domain);
        let key = M::key(domain);

        self.collection
            .replace_one(M::key_filter(&key), &entity)
            .upsert(true)
            .await
            .map_err(|source| document_err("put", source))?;
        Ok(())
    }
}
