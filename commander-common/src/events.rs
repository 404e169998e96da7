//! The cross-replica event bus contract (spec §4.8). The persistence layer
//! alone cannot push a newly applied remote config to an agent attached to a
//! different replica's WebSocket; this module is the port every replica
//! publishes to and subscribes from.
//!
//! [`LocalEventBus`] is an in-process `tokio::broadcast`-backed
//! implementation, grounded on the same subscribe/filter shape the teacher
//! workspace uses for its own event stream. It is useful standalone (a
//! single-replica deployment, or tests) and as the building block a
//! multi-process implementation (backed by e.g. a pub/sub service) would wrap
//! with real network fan-out — that transport glue is dependency-injection
//! wiring and out of scope for this crate (spec §1).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};

/// A payload-free notification that one or more agents have pending server
/// messages the receiving replica should re-derive from persistence and
/// enqueue on its local `Connection`, if any (spec §4.8: "receivers reload
/// from persistence").
#[derive(Debug, Clone)]
pub enum BusEnvelope {
    AgentGroupUpdated {
        group_name: Arc<str>,
    },
    SendServerToAgent {
        /// The replica this message is addressed to.
        server_id: Arc<str>,
        target_instance_uids: Arc<[String]>,
    },
}

/// The outbound event-bus port (spec §6). Delivery is best-effort
/// at-least-once: implementations MUST NOT propagate a transient send
/// failure as an error the caller needs to handle, since periodic full-state
/// sweeps are the backstop (spec §7).
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish_agent_group_updated(&self, group_name: &str);

    async fn send_message_to_server(&self, server_id: &str, target_instance_uids: Vec<String>);

    fn subscribe(&self) -> EventBusSubscriber;
}

#[derive(Debug)]
pub struct LocalEventBus {
    tx: broadcast::Sender<Arc<BusEnvelope>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(1024).0,
        }
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for LocalEventBus {
    async fn publish_agent_group_updated(&self, group_name: &str) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        let _ = self.tx.send(Arc::new(BusEnvelope::AgentGroupUpdated {
            group_name: Arc::from(group_name),
        }));
    }

    async fn send_message_to_server(&self, server_id: &str, target_instance_uids: Vec<String>) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        let _ = self.tx.send(Arc::new(BusEnvelope::SendServerToAgent {
            server_id: Arc::from(server_id),
            target_instance_uids: Arc::from(target_instance_uids),
        }));
    }

    fn subscribe(&self) -> EventBusSubscriber {
        EventBusSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

pub struct EventBusSubscriber {
    rx: broadcast::Receiver<Arc<BusEnvelope>>,
}

impl EventBusSubscriber {
    /// Await the next envelope, transparently skipping past a lag
    /// disconnection by resuming from the next available message (logging
    /// how many were dropped), since the bus is explicitly best-effort.
    pub async fn recv(&mut self) -> Option<Arc<BusEnvelope>> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Closed) => return None,
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("event bus subscriber lagged, dropped {n} envelopes");
                    continue;
                }
            }
        }
    }
}
