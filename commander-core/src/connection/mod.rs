//! The connection layer (spec §4.3): a per-agent outbound channel with an
//! oldest-drop overflow policy, a liveness predicate, and a process-wide
//! registry (§4.3 "Registry", implemented in [`registry`]).

pub mod registry;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Transport carrying one Connection. Also reused by `AgentStatus` to record
/// how an agent last reported in (spec §3: "connectionType").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionType {
    #[default]
    Unknown,
    Http,
    WebSocket,
}

/// Opaque backend handle identifying one Connection within this replica's
/// registry (spec §3: "id (opaque backend handle)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

/// A message already addressed to an agent's transport. The core treats its
/// payload as opaque (spec §1: "OpAMP protobuf encoding ... opaque"); only
/// the bytes matter for delivery, not their interpretation.
#[derive(Debug, Clone)]
pub struct ServerToAgent {
    pub payload: bytes::Bytes,
}

const DEFAULT_OUTBOUND_CAPACITY: usize = 16;

/// One Connection's outbound channel (spec §4.3, §5 "Connection outbound
/// channels are owned by their Connection; one producer, one consumer").
/// `mpsc::channel` already drops neither side silently on a full buffer —
/// `send` simply waits — so the oldest-drop policy the spec mandates is
/// implemented explicitly in [`Connection::send_server_to_agent`] rather than
/// relying on channel backpressure.
pub struct Connection {
    pub id: ConnectionId,
    pub r#type: ConnectionType,
    pub instance_uid: Option<Uuid>,
    pub last_communicated_at: DateTime<Utc>,
    tx: mpsc::Sender<ServerToAgent>,
    rx: mpsc::Receiver<ServerToAgent>,
    capacity: usize,
    dropped: u64,
}

impl Connection {
    pub fn new(id: ConnectionId, r#type: ConnectionType, now: DateTime<Utc>) -> Self {
        Self::with_capacity(id, r#type, now, DEFAULT_OUTBOUND_CAPACITY)
    }

    pub fn with_capacity(
        id: ConnectionId,
        r#type: ConnectionType,
        now: DateTime<Utc>,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            id,
            r#type,
            instance_uid: None,
            last_communicated_at: now,
            tx,
            rx,
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Non-blocking enqueue. When the channel is full the oldest queued
    /// message is dropped to make room for `msg` (spec §4.3, and §9 "Open
    /// questions": oldest-drop is mandated because persistence is the
    /// source of truth and newer intent dominates).
    pub fn send_server_to_agent(&mut self, msg: ServerToAgent) {
        loop {
            match self.tx.try_send(msg.clone()) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if self.rx.try_recv().is_ok() {
                        self.dropped += 1;
                        tracing::warn!(connection_id = ?self.id, dropped = self.dropped, "outbound channel full, dropped oldest message");
                    } else {
                        // Another task drained it between our full-check and
                        // the drop attempt; just retry the send.
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => return,
            }
        }
    }

    /// Blocking dequeue, honouring cancellation (spec §4.3). For HTTP
    /// polling this is the long-poll wait; the caller is expected to race it
    /// against a `pollingInterval` timeout of its own.
    pub async fn fetch_server_to_agent(&mut self) -> Option<ServerToAgent> {
        self.rx.recv().await
    }

    pub fn record_communication(&mut self, now: DateTime<Utc>) {
        self.last_communicated_at = now;
    }

    /// `type = WebSocket OR now - last_communicated_at < 2 * polling_interval`
    /// (spec §4.3 "Liveness").
    pub fn is_alive(&self, now: DateTime<Utc>, polling_interval: Duration) -> bool {
        if self.r#type == ConnectionType::WebSocket {
            return true;
        }
        let elapsed = now.signed_duration_since(self.last_communicated_at);
        match chrono::Duration::from_std(polling_interval * 2) {
            Ok(threshold) => elapsed < threshold,
            Err(_) => true,
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("type", &self.r#type)
            .field("instance_uid", &self.instance_uid)
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn payload(n: u8) -> ServerToAgent {
        ServerToAgent {
            payload: bytes::Bytes::from(vec![n]),
        }
    }

    #[tokio::test]
    async fn full_channel_drops_oldest_in_favour_of_newest() {
        let mut conn = Connection::with_capacity(
            ConnectionId::new(Uuid::nil()),
            ConnectionType::Http,
            Utc::now(),
            2,
        );
        conn.send_server_to_agent(payload(1));
        conn.send_server_to_agent(payload(2));
        conn.send_server_to_agent(payload(3));

        assert_eq!(conn.dropped_count(), 1);
        let first = conn.fetch_server_to_agent().await.unwrap();
        assert_eq!(first.payload.as_ref(), [2]);
        let second = conn.fetch_server_to_agent().await.unwrap();
        assert_eq!(second.payload.as_ref(), [3]);
    }

    #[test]
    fn websocket_connections_are_always_alive() {
        let now = Utc::now();
        let mut conn = Connection::new(ConnectionId::new(Uuid::nil()), ConnectionType::WebSocket, now);
        conn.record_communication(now - chrono::Duration::days(1));
        assert!(conn.is_alive(now, Duration::from_secs(30)));
    }

    /// `2 * polling_interval` with a 30s interval puts the liveness boundary
    /// at 60s (spec §4.3 "Liveness"): strictly under is alive, at or past is
    /// dead.
    #[rstest]
    #[case(10, true)]
    #[case(59, true)]
    #[case(60, false)]
    #[case(61, false)]
    fn http_connection_liveness_depends_on_elapsed_time(
        #[case] elapsed_secs: i64,
        #[case] expected_alive: bool,
    ) {
        let now = Utc::now();
        let mut conn = Connection::new(ConnectionId::new(Uuid::nil()), ConnectionType::Http, now);
        conn.record_communication(now);
        let later = now + chrono::Duration::seconds(elapsed_secs);
        assert_eq!(conn.is_alive(later, Duration::from_secs(30)), expected_alive);
    }
}
