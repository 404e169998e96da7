//! `RemoteConfig` (spec §3 "RemoteConfig", §4.1 "Remote-config application"):
//! an ordered list of content-addressed `Command`s, one per distinct config
//! value ever applied, each tracked through its own Unset/Applying/Applied/
//! Failed state machine (spec §4.1 "State machine for a single remote-config
//! key").

use chrono::{DateTime, Utc};
use commander_common::Hash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteConfigStatus {
    Unset,
    Applying,
    Applied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub key: Hash,
    pub status: RemoteConfigStatus,
    pub config_bytes: Vec<u8>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub remote_config_commands: Vec<Command>,
    pub last_error_message: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl RemoteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(&self, key: Hash) -> Option<&Command> {
        self.remote_config_commands.iter().find(|c| c.key == key)
    }

    fn command_mut(&mut self, key: Hash) -> Option<&mut Command> {
        self.remote_config_commands
            .iter_mut()
            .find(|c| c.key == key)
    }

    /// Canonicalises `config_bytes` into its content-addressed key, appends a
    /// new `Unset` command if that key hasn't been seen before, and advances
    /// `last_modified_at`. Applying the same bytes twice is a no-op beyond
    /// the timestamp bump (spec §4.1, §8 invariant: `len` grows by at most
    /// one per distinct value).
    pub fn apply(&mut self, config_bytes: Vec<u8>, now: DateTime<Utc>) -> Hash {
        let key = Hash::of_bytes(&config_bytes);
        if self.command(key).is_none() {
            self.remote_config_commands.push(Command {
                key,
                status: RemoteConfigStatus::Unset,
                config_bytes,
                last_updated_at: now,
            });
        }
        self.last_modified_at = Some(now);
        key
    }

    /// First offer of a previously `Unset` key transitions it to `Applying`
    /// (the "offer sent" step of the state machine); re-offering an already
    /// `Applying`/`Applied`/`Failed` key is left untouched here, the caller
    /// decides whether to re-offer.
    pub fn mark_offered(&mut self, key: Hash, now: DateTime<Utc>) {
        if let Some(cmd) = self.command_mut(key) {
            if cmd.status == RemoteConfigStatus::Unset {
                cmd.status = RemoteConfigStatus::Applying;
                cmd.last_updated_at = now;
            }
        }
    }

    /// Agent-reported outcome for `key`: `Applied` or `Failed`. Unknown keys
    /// are ignored (the agent may be reporting about a config this replica
    /// never offered, e.g. stale state after a failover).
    pub fn report_status(
        &mut self,
        key: Hash,
        status: RemoteConfigStatus,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) {
        if let Some(cmd) = self.command_mut(key) {
            cmd.status = status;
            cmd.last_updated_at = now;
        }
        if status == RemoteConfigStatus::Failed {
            self.last_error_message = error_message;
        }
    }
}

/// The standalone resource an `Agent`'s `spec.remoteConfig.remoteConfigNames`
/// refers to by name (spec §3: "AgentRemoteConfigResource ... auxiliary
/// resources sharing the `{metadata, spec, status}` shape and soft-delete
/// discipline"). The `Command` state machine lives in `status`, since it's
/// observed/derived rather than operator-authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRemoteConfigResourceMetadata {
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRemoteConfigResourceSpec {
    pub config_value: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRemoteConfigResource {
    pub metadata: AgentRemoteConfigResourceMetadata,
    pub spec: AgentRemoteConfigResourceSpec,
    pub status: RemoteConfig,
}

impl Default for AgentRemoteConfigResourceMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            deleted_at: None,
        }
    }
}

impl AgentRemoteConfigResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: AgentRemoteConfigResourceMetadata {
                name: name.into(),
                deleted_at: None,
            },
            spec: AgentRemoteConfigResourceSpec::default(),
            status: RemoteConfig::new(),
        }
    }

    /// `ApplyRemoteConfig(configValue)` (spec §4.1): canonicalises and hashes
    /// `config_value`, appending a new command to `status` iff the key is
    /// new.
    pub fn apply_remote_config(&mut self, config_value: Vec<u8>, now: DateTime<Utc>) -> Hash {
        self.spec.config_value = config_value.clone();
        self.status.apply(config_value, now)
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.metadata.deleted_at = Some(now);
    }

    pub fn is_deleted(&self) -> bool {
        self.metadata.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    #[test]
    fn applying_same_value_twice_is_idempotent() {
        let mut rc = RemoteConfig::new();
        let k1 = rc.apply(b"key: value".to_vec(), t(1));
        let k2 = rc.apply(b"key: value".to_vec(), t(2));
        assert_eq!(k1, k2);
        assert_eq!(rc.remote_config_commands.len(), 1);
    }

    #[test]
    fn key_equals_hash_of_bytes() {
        let mut rc = RemoteConfig::new();
        let key = rc.apply(b"payload".to_vec(), t(1));
        assert_eq!(key, Hash::of_bytes(b"payload"));
    }

    #[test]
    fn distinct_values_each_get_a_command() {
        let mut rc = RemoteConfig::new();
        rc.apply(b"a".to_vec(), t(1));
        rc.apply(b"b".to_vec(), t(1));
        assert_eq!(rc.remote_config_commands.len(), 2);
    }

    #[test]
    fn applied_status_transitions_and_preserves_error_message() {
        let mut rc = RemoteConfig::new();
        let key = rc.apply(b"x".to_vec(), t(1));
        rc.mark_offered(key, t(2));
        rc.report_status(key, RemoteConfigStatus::Failed, Some("bad yaml".into()), t(3));
        assert_eq!(rc.command(key).unwrap().status, RemoteConfigStatus::Failed);
        assert_eq!(rc.last_error_message.as_deref(), Some("bad yaml"));
    }
}
