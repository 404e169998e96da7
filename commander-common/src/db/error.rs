//! The persistence error taxonomy (spec §7). Every backend binding converts
//! its own driver errors into one of these variants; callers branch on
//! `NotFound`/`MultipleExist` directly and treat `BackendError` as retryable
//! at their discretion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("resource `{0}` not found")]
    NotFound(String),

    #[error("multiple resources matched unique key `{0}`")]
    MultipleExist(String),

    #[error("invalid continue token `{0}`")]
    InvalidContinueToken(String),

    #[error("decoding resource `{key}` in `{collection}`: {source}")]
    Decode {
        key: String,
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encoding resource for `{collection}`: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("sorted-key backend error during {operation}: {source}")]
    #[cfg(feature = "sorted-backend")]
    Sorted {
        operation: String,
        #[source]
        source: sled::Error,
    },

    #[error("document backend error during {operation}: {source}")]
    #[cfg(feature = "document-backend")]
    Document {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("backend error during {operation}: {message}")]
    BackendError { operation: String, message: String },
}

impl DatabaseError {
    pub fn backend(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::BackendError {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}
