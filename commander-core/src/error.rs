//! Core-level error taxonomy (spec §7), composing the persistence layer's
//! [`commander_common::db::DatabaseError`] with the reducer/capability
//! failures that only make sense once a domain model exists on top of
//! storage. Follows the teacher's `ServerError`/`CannonError` shape: one
//! `thiserror` enum per subsystem, each variant carrying enough context to
//! log without re-deriving it at the call site.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Database(#[from] commander_common::db::DatabaseError),

    /// Spec §7: "programmer attempted a mutation the agent's capability
    /// bitset disallows."
    #[error("agent {instance_uid} does not support operation `{operation}`")]
    UnsupportedAgentOperation {
        instance_uid: Uuid,
        operation: &'static str,
    },

    /// Reserved for future content-type gating on remote config application
    /// (spec §7).
    #[error("remote config content type `{content_type}` is not supported")]
    UnsupportedRemoteConfigContentType { content_type: String },

    /// Spec §5 "Cancellation": surfaces as a typed error rather than a raw
    /// backend timeout.
    #[error("operation `{operation}` was cancelled")]
    Cancelled { operation: String },
}
