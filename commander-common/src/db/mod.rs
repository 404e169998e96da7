//! The generic persistence layer (spec §4.4–§4.7): a backend-agnostic
//! [`Adapter`] facade, a sorted-key binding (`sled`), a document-store binding
//! (`mongodb`), cursor-based pagination, and attribute selectors.

pub mod error;
pub mod mapping;
pub mod pagination;
pub mod selector;

#[cfg(feature = "sorted-backend")]
pub mod sorted;

#[cfg(feature = "document-backend")]
pub mod document;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::DatabaseError;
pub use mapping::{Adapter, ResourceMapping};
pub use pagination::{ListOptions, ListResponse};
pub use selector::Selector;

#[cfg(feature = "sorted-backend")]
pub use sorted::SortedAdapter;

#[cfg(feature = "document-backend")]
pub use document::{selector_to_match_conditions, DocumentAdapter, DocumentMapping};

#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockDocumentAdapter, MockSortedAdapter};
