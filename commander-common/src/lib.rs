//! Shared primitives for the opampcommander control plane.
//!
//! This crate carries the pieces that are useful regardless of which domain
//! aggregate sits on top of them: content-addressed hashing over canonical
//! JSON, the generic persistence adapter (and its two backend bindings), and
//! the cross-replica event bus contract. `commander-core` builds the OpAMP
//! domain model on top of these.

pub mod db;
pub mod events;
pub mod format;
pub mod hash;

pub use hash::Hash;
