//! Per-resource persistence bindings (spec §4.4 "Every resource ... has its
//! own instantiation"): a [`ResourceMapping`]/[`DocumentMapping`] pair per
//! domain aggregate, plus the concrete [`AgentLookup`](crate::agent_group::AgentLookup)
//! implementations selector resolution and group statistics rely on.

pub mod agent;
pub mod agent_group;
pub mod auxiliary;
pub mod entity;
pub mod remote_config_resource;

use async_trait::async_trait;
use commander_common::db::{
    document::DocumentAdapter, pagination::ListOptions, sorted::SortedAdapter, Adapter, Selector,
};

pub use agent::AgentMapping;
pub use agent_group::AgentGroupMapping;
pub use auxiliary::{AgentPackageMapping, CertificateMapping, ServerMapping};
pub use remote_config_resource::AgentRemoteConfigResourceMapping;

use crate::{agent::Agent, agent_group::AgentLookup, error::CoreError};

/// `ListBySelector` on the document backend (spec §6 outbound persistence
/// port): delegates straight to [`DocumentAdapter::list_by_selector`], which
/// already applies the soft-delete filter and `$elemMatch` translation.
pub struct DocumentAgentLookup {
    adapter: DocumentAdapter<AgentMapping>,
}

impl DocumentAgentLookup {
    pub fn new(database: &mongodb::Database) -> Self {
        Self {
            adapter: DocumentAdapter::new(database),
        }
    }
}

#[async_trait]
impl AgentLookup for DocumentAgentLookup {
    async fn list_by_selector(&self, selector: &Selector) -> Result<Vec<Agent>, CoreError> {
        Ok(self.adapter.list_by_selector(selector).await?)
    }
}

/// `ListBySelector` on the sorted-key backend: the store has no query
/// language, so this scans every Agent page by page and filters client-side
/// (spec §4.6 doc comment: "both the sorted-key (client-side filter) and
/// document (`$elemMatch` query) bindings share one definition").
pub struct SortedAgentLookup {
    adapter: SortedAdapter<AgentMapping>,
}

impl SortedAgentLookup {
    pub fn open(db: &sled::Db) -> Result<Self, CoreError> {
        Ok(Self {
            adapter: SortedAdapter::open(db)?,
        })
    }
}

#[async_trait]
impl AgentLookup for SortedAgentLookup {
    async fn list_by_selector(&self, selector: &Selector) -> Result<Vec<Agent>, CoreError> {
        let mut matching = Vec::new();
        let mut token = String::new();
        loop {
            let page = self
                .adapter
                .list(ListOptions::new(256).with_continue(token))
                .await?;
            matching.extend(page.items.into_iter().filter(|agent: &Agent| {
                selector.matches(
                    agent.metadata.description.identifying_attributes.as_map(),
                    agent.metadata.description.non_identifying_attributes.as_map(),
                )
            }));
            if page.is_last_page() {
                break;
            }
            token = page.r#continue;
        }
        Ok(matching)
    }
}
