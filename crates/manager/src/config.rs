//! [`ManagerConfig`] — the scaled-down analogue of the teacher's layered
//! `nebula-config` loader: a handful of knobs read from environment
//! variables with `serde`-backed defaults, no file/flag layering.

use serde::{Deserialize, Serialize};

/// Which [`nebula_storage::PersistenceAdapter`] backend the manager is
/// wired against. Only `Memory` has a concrete implementation in this
/// workspace (spec §4.G "Reference backend"); the variant exists so a
/// future real backend has a named slot in config without touching the
/// Manager's call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// Manager-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Applied to a node's `timeout` when it declares none (spec §4.D).
    pub default_node_timeout_secs: u64,
    /// Ceiling on a node's `retry` count regardless of what it declares.
    pub max_retries: u32,
    /// Granularity schedule tasks fall back to re-deriving their next fire
    /// time at, beyond the exact instant `cron::Schedule::upcoming` already
    /// gives them - kept as a config knob for parity with the original's
    /// poll-loop shape, though the cron path (§9 REDESIGN FLAGS) makes it
    /// informational rather than load-bearing.
    pub schedule_poll_interval_secs: u64,
    pub storage_backend: StorageBackend,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_node_timeout_secs: 30,
            max_retries: 5,
            schedule_poll_interval_secs: 60,
            storage_backend: StorageBackend::Memory,
        }
    }
}

impl ManagerConfig {
    /// Overlay environment variables onto [`Self::default`]. Any variable
    /// that is unset, or fails to parse, falls back to the default value
    /// (logged at `warn` for a malformed-but-present variable).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = parse_env("NEBULA_DEFAULT_NODE_TIMEOUT_SECS") {
            config.default_node_timeout_secs = v;
        }
        if let Some(v) = parse_env("NEBULA_MAX_RETRIES") {
            config.max_retries = v;
        }
        if let Some(v) = parse_env("NEBULA_SCHEDULE_POLL_INTERVAL_SECS") {
            config.schedule_poll_interval_secs = v;
        }
        if let Ok(raw) = std::env::var("NEBULA_STORAGE_BACKEND") {
            match raw.to_lowercase().as_str() {
                "memory" => config.storage_backend = StorageBackend::Memory,
                other => tracing::warn!(value = other, "unrecognized NEBULA_STORAGE_BACKEND, keeping default"),
            }
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%key, value = %raw, "failed to parse environment variable, keeping default");
                None
            }
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ManagerConfig::default();
        assert_eq!(config.default_node_timeout_secs, 30);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }
}
