// Path: crates/types/src/config.rs
//! `CoreConfig` (§6.1, §9 "Global singleton config"): an explicit,
//! immutable value constructed once at startup and passed by shared
//! reference into the components that need it. No component reads the
//! config file or the environment on its own.

use crate::error::ConfigError;
use crate::ids::PublicKeyBytes;
use serde::{Deserialize, Serialize};

fn default_concurrency() -> usize {
    1
}
fn default_pool_queue_size() -> usize {
    1024
}
fn default_panic_timeout_ms() -> u64 {
    3000
}
fn default_database_path() -> String {
    "/tmp/iroha".to_string()
}

/// One entry of the initial peer set, `{ ip, public_key }` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfigEntry {
    pub ip: String,
    #[serde(with = "hex_public_key")]
    pub public_key: PublicKeyBytes,
}

/// `me`: this replica's own identity, including its private key (§6). Kept
/// out of `Debug`/logs deliberately narrow — only the public parts are
/// printed by `CoreConfig`'s own diagnostic helpers.
#[derive(Clone, Serialize, Deserialize)]
pub struct MeConfigEntry {
    pub ip: String,
    #[serde(with = "hex_public_key")]
    pub public_key: PublicKeyBytes,
    /// Hex-encoded Ed25519 secret key. Never logged.
    pub private_key: String,
}

impl std::fmt::Debug for MeConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeConfigEntry")
            .field("ip", &self.ip)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

mod hex_public_key {
    use super::PublicKeyBytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(key: &PublicKeyBytes, s: S) -> Result<S::Ok, S::Error> {
        key.to_hex().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PublicKeyBytes, D::Error> {
        let s = String::deserialize(d)?;
        PublicKeyBytes::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// The enumerated, recognized configuration options (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Override `f`; if absent, `f = N/3`.
    #[serde(default)]
    pub max_faulty_peers: Option<usize>,
    /// Worker-pool size.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Max queued events before blocking.
    #[serde(default = "default_pool_queue_size")]
    pub pool_worker_queue_size: usize,
    /// Per-event panic timer.
    #[serde(default = "default_panic_timeout_ms")]
    pub panic_timeout_ms: u64,
    /// Storage directory.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    pub peers: Vec<PeerConfigEntry>,
    pub me: MeConfigEntry,
}

impl CoreConfig {
    /// Rejects a config with zero peers, a `me` not present in `peers`, or a
    /// zero `panic_timeout_ms`. Always called immediately after
    /// deserialization, before any component is constructed, so a bad
    /// config is the one place this codebase aborts at startup rather than
    /// propagating a `Result` (§9).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peers.is_empty() {
            return Err(ConfigError::NoPeers);
        }
        if !self.peers.iter().any(|p| p.public_key == self.me.public_key) {
            return Err(ConfigError::MeNotInPeerSet);
        }
        if self.panic_timeout_ms == 0 {
            return Err(ConfigError::ZeroPanicTimeout);
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml_lib_parse(s)?;
        config.validate()?;
        Ok(config)
    }
}

// Kept as a free function so `toml`'s concrete error type never leaks past
// this module's boundary; callers only ever see `ConfigError`.
fn toml_lib_parse(s: &str) -> Result<CoreConfig, ConfigError> {
    toml::from_str(s).map_err(|e| ConfigError::ParseFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> String {
        format!(
            r#"
            database_path = "/tmp/sumeragi-test"

            [[peers]]
            ip = "127.0.0.1:9001"
            public_key = "{}"

            [me]
            ip = "127.0.0.1:9001"
            public_key = "{}"
            private_key = "{}"
            "#,
            "11".repeat(32),
            "11".repeat(32),
            "22".repeat(32)
        )
    }

    #[test]
    fn parses_defaults() {
        let config = CoreConfig::from_toml_str(&sample_toml()).expect("valid config");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.pool_worker_queue_size, 1024);
        assert_eq!(config.panic_timeout_ms, 3000);
        assert_eq!(config.database_path, "/tmp/sumeragi-test");
    }

    #[test]
    fn rejects_me_not_in_peer_set() {
        let mut config: CoreConfig = toml::from_str(&sample_toml()).expect("parse");
        config.me.public_key = PublicKeyBytes([0xff; 32]);
        assert_eq!(config.validate(), Err(ConfigError::MeNotInPeerSet));
    }

    #[test]
    fn rejects_zero_panic_timeout() {
        let mut config: CoreConfig = toml::from_str(&sample_toml()).expect("parse");
        config.panic_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPanicTimeout));
    }
}
