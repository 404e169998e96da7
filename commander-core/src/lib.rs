//! Domain model, connection layer, and persistence bindings for an OpAMP
//! commander control plane: the Agent aggregate and its reducers, the
//! AgentGroup selector/priority/statistics machinery, the RemoteConfig
//! content-addressed state machine, the per-connection outbound channel and
//! registry, and the per-resource persistence bindings on top of
//! `commander_common`'s generic adapter.
//!
//! HTTP/CLI wiring, authentication, and OpAMP protobuf decoding are out of
//! scope; this crate exposes interface contracts for them (see [`ports`])
//! and expects an embedding server to supply the rest.

pub mod agent;
pub mod agent_group;
pub mod attributes;
pub mod capabilities;
pub mod condition;
pub mod config;
pub mod connection;
pub mod connection_info;
pub mod error;
pub mod persistence;
pub mod ports;
pub mod remote_config;
pub mod resources;

pub use agent::Agent;
pub use agent_group::AgentGroup;
pub use error::CoreError;
