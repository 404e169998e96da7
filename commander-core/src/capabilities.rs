//! Agent capability bitset (spec §3 Metadata, §9 "Capabilities as a
//! bitset"). Bit values mirror the OpAMP wire protocol's `AgentCapabilities`
//! enum so a handler translating an opaque `AgentToServer.capabilities`
//! field can hand it straight to [`Capabilities::from_bits_truncate`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u64 {
        const REPORTS_STATUS = 1;
        const ACCEPTS_REMOTE_CONFIG = 2;
        const REPORTS_EFFECTIVE_CONFIG = 4;
        const ACCEPTS_PACKAGES = 8;
        const REPORTS_PACKAGE_STATUSES = 16;
        const REPORTS_OWN_TRACES = 32;
        const REPORTS_OWN_METRICS = 64;
        const REPORTS_OWN_LOGS = 128;
        const ACCEPTS_OPAMP_CONNECTION_SETTINGS = 256;
        const ACCEPTS_OTHER_CONNECTION_SETTINGS = 512;
        const ACCEPTS_RESTART_COMMAND = 1024;
        const REPORTS_HEALTH = 2048;
        const REPORTS_REMOTE_CONFIG = 4096;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl Capabilities {
    pub fn has_accepts_remote_config(&self) -> bool {
        self.contains(Capabilities::ACCEPTS_REMOTE_CONFIG)
    }

    pub fn has_accepts_packages(&self) -> bool {
        self.contains(Capabilities::ACCEPTS_PACKAGES)
    }

    pub fn has_accepts_opamp_connection_settings(&self) -> bool {
        self.contains(Capabilities::ACCEPTS_OPAMP_CONNECTION_SETTINGS)
    }

    pub fn has_accepts_other_connection_settings(&self) -> bool {
        self.contains(Capabilities::ACCEPTS_OTHER_CONNECTION_SETTINGS)
    }

    pub fn has_accepts_restart_command(&self) -> bool {
        self.contains(Capabilities::ACCEPTS_RESTART_COMMAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bitset_has_no_capabilities() {
        let caps = Capabilities::default();
        assert!(!caps.has_accepts_remote_config());
        assert!(caps.is_empty());
    }

    #[test]
    fn combines_with_bitor() {
        let caps = Capabilities::REPORTS_STATUS | Capabilities::ACCEPTS_REMOTE_CONFIG;
        assert!(caps.has_accepts_remote_config());
        assert!(caps.contains(Capabilities::REPORTS_STATUS));
        assert!(!caps.has_accepts_packages());
    }
}
