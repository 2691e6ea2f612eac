// ── Runtime client configuration ──
//
// Describes how the client talks to the service and how it syncs.
// Never touches disk; `glowkit-config` builds one from a profile.

use serde::{Deserialize, Serialize};

use glowkit_api::SessionConfig;

/// What to do with an optimistic update whose command failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Leave the optimistic values in place until the next fetch.
    #[default]
    Keep,
    /// Restore the pre-command values of lights that were not changed
    /// again since.
    Revert,
}

/// Cache synchronization behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub rollback: RollbackPolicy,
    /// Background fetch interval in seconds. 0 = never.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            rollback: RollbackPolicy::Keep,
            refresh_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub session: SessionConfig,
    pub sync: SyncOptions,
}

impl ClientConfig {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            sync: SyncOptions::default(),
        }
    }

    pub fn with_sync(mut self, sync: SyncOptions) -> Self {
        self.sync = sync;
        self
    }
}
