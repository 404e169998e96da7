//! Ambient configuration surfaces (spec §4.11): plain `serde::Deserialize`
//! structs declaring the shape an embedding binary loads (from YAML, env, or
//! whatever source it prefers — e.g. `serde_yaml` over a config file, the way
//! the teacher's own binaries deserialise their CLI/env configuration). This
//! crate only declares the shape; it takes no dependency on a loader or a
//! CLI parser of its own, consistent with "DI glue is out of scope" (spec
//! §1).

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Sorted,
    Document,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    pub backend: BackendKind,
    pub sorted_path: Option<PathBuf>,
    pub document_uri: Option<String>,
    pub document_database: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(with = "humantime_serde_duration", default = "default_polling_interval")]
    pub polling_interval: Duration,
    #[serde(default = "default_outbound_channel_capacity")]
    pub outbound_channel_capacity: usize,
}

fn default_polling_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_outbound_channel_capacity() -> usize {
    16
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            polling_interval: default_polling_interval(),
            outbound_channel_capacity: default_outbound_channel_capacity(),
        }
    }
}

/// `polling_interval` is expressed as a plain number of seconds in config
/// files (`30` rather than `"30s"`), matched by a small custom deserializer
/// rather than pulling in a duration-parsing crate the teacher doesn't use.
mod humantime_serde_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_config_defaults_match_spec() {
        let cfg = ConnectionConfig::default();
        assert_eq!(cfg.polling_interval, Duration::from_secs(30));
        assert_eq!(cfg.outbound_channel_capacity, 16);
    }
}
