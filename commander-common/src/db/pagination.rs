//! Cursor-based pagination envelope shared by both backend bindings (spec
//! §4.5). Continue-token *encoding* differs per backend (suffix-null successor
//! key for the sorted store, hex ObjectID for the document store); callers
//! treat the token as opaque.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// 0 means unbounded.
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub r#continue: String,
}

impl ListOptions {
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            r#continue: String::new(),
        }
    }

    pub fn with_continue(mut self, token: impl Into<String>) -> Self {
        self.r#continue = token.into();
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit <= 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Empty if this is the last page.
    pub r#continue: String,
    pub remaining_item_count: i64,
}

impl<T> ListResponse<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            r#continue: String::new(),
            remaining_item_count: 0,
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.r#continue.is_empty()
    }
}
