//! Process-wide connection registry (spec §4.3 "Registry"): maps `connID ->
//! WebSocketConnection` and `instanceUID -> connID`. Authoritative only for
//! this replica; reaching a connection on another replica goes through the
//! cross-replica event bus instead (spec §4.8).
//!
//! Grounded on the teacher's `DashMap`-keyed pool (`state::AgentPool`):
//! short-held per-key locks instead of one `Mutex<HashMap<...>>` guarding the
//! whole registry.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{Connection, ConnectionId};

#[derive(Default)]
pub struct ConnectionRegistry {
    by_id: DashMap<ConnectionId, Connection>,
    by_instance_uid: DashMap<Uuid, ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection: Connection) {
        let id = connection.id;
        if let Some(instance_uid) = connection.instance_uid {
            self.by_instance_uid.insert(instance_uid, id);
        }
        self.by_id.insert(id, connection);
    }

    pub fn remove(&self, id: ConnectionId) -> Option<Connection> {
        let removed = self.by_id.remove(&id).map(|(_, conn)| conn);
        if let Some(conn) = &removed {
            if let Some(instance_uid) = conn.instance_uid {
                self.by_instance_uid.remove(&instance_uid);
            }
        }
        removed
    }

    /// `UpdateInstanceUID` (spec §4.3): called once a connection has
    /// identified itself, since a connection's instance UID is unknown at
    /// handshake time.
    pub fn update_instance_uid(&self, id: ConnectionId, instance_uid: Uuid) {
        if let Some(mut conn) = self.by_id.get_mut(&id) {
            conn.instance_uid = Some(instance_uid);
        }
        self.by_instance_uid.insert(instance_uid, id);
    }

    pub fn get_by_instance_uid(&self, instance_uid: Uuid) -> Option<ConnectionId> {
        self.by_instance_uid.get(&instance_uid).map(|id| *id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Reap connections that have gone quiet (spec §4.3, §5 "housekeeping
    /// timer for connection reaping"). Returns the instance UIDs of whatever
    /// was removed so the caller can tear down any upstream state.
    pub fn reap(&self, now: DateTime<Utc>, polling_interval: Duration) -> Vec<Uuid> {
        let dead: Vec<ConnectionId> = self
            .by_id
            .iter()
            .filter(|entry| !entry.value().is_alive(now, polling_interval))
            .map(|entry| *entry.key())
            .collect();

        let mut reaped_instance_uids = Vec::new();
        for id in dead {
            if let Some(conn) = self.remove(id) {
                if let Some(instance_uid) = conn.instance_uid {
                    tracing::debug!(%instance_uid, connection_id = ?id, "reaping dead connection");
                    reaped_instance_uids.push(instance_uid);
                }
            }
        }
        reaped_instance_uids
    }

    /// Run `f` against the connection for `id`, if one is registered. Kept
    /// as an access method rather than exposing `&mut Connection` directly
    /// so the `DashMap` shard lock is never held across an `.await`.
    pub fn with_connection_mut<R>(&self, id: ConnectionId, f: impl FnOnce(&mut Connection) -> R) -> Option<R> {
        self.by_id.get_mut(&id).map(|mut conn| f(&mut conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionType;

    #[test]
    fn register_and_look_up_by_instance_uid() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new(Uuid::new_v4());
        let instance_uid = Uuid::new_v4();
        let mut conn = Connection::new(id, ConnectionType::WebSocket, Utc::now());
        conn.instance_uid = Some(instance_uid);
        registry.register(conn);

        assert_eq!(registry.get_by_instance_uid(instance_uid), Some(id));
        assert!(registry.contains(id));
    }

    #[test]
    fn remove_clears_both_indices() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new(Uuid::new_v4());
        let instance_uid = Uuid::new_v4();
        let mut conn = Connection::new(id, ConnectionType::WebSocket, Utc::now());
        conn.instance_uid = Some(instance_uid);
        registry.register(conn);

        registry.remove(id);
        assert!(!registry.contains(id));
        assert_eq!(registry.get_by_instance_uid(instance_uid), None);
    }

    #[test]
    fn reap_removes_dead_http_connections_only() {
        let registry = ConnectionRegistry::new();
        let now = Utc::now();

        let alive_id = ConnectionId::new(Uuid::new_v4());
        registry.register(Connection::new(alive_id, ConnectionType::WebSocket, now));

        let dead_id = ConnectionId::new(Uuid::new_v4());
        let mut dead = Connection::new(dead_id, ConnectionType::Http, now);
        dead.record_communication(now - chrono::Duration::seconds(120));
        registry.register(dead);

        let reaped = registry.reap(now, Duration::from_secs(30));
        assert!(registry.contains(alive_id));
        assert!(!registry.contains(dead_id));
        assert_eq!(reaped.len(), 1);
    }
}
