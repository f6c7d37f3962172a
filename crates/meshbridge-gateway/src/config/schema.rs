use std::collections::HashSet;

use serde::Deserialize;

use meshbridge_core::crypto::ChannelKey;
use meshbridge_core::error::{MeshBridgeError, Result};
use meshbridge_core::hops::MAX_HOPS;
use meshbridge_core::protocol::PortNum;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    pub broker: BrokerSection,

    /// Shared channel key, transport encoded (base64). Empty disables crypto.
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default = "default_hop_modifier")]
    pub hop_modifier: u32,

    #[serde(default = "default_forwarded_portnums")]
    pub forwarded_portnums: Vec<i32>,

    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,

    #[serde(default)]
    pub relay: RelaySection,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeshBridgeError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.broker.validate()?;

        ChannelKey::parse(&self.key)
            .map_err(|e| MeshBridgeError::BadConfig(format!("key: {e}")))?;

        if self.hop_modifier > MAX_HOPS {
            return Err(MeshBridgeError::BadConfig(format!(
                "hop_modifier must be between 0 and {MAX_HOPS}"
            )));
        }

        if self.forwarded_portnums.is_empty() {
            return Err(MeshBridgeError::BadConfig(
                "forwarded_portnums must not be empty".into(),
            ));
        }
        for p in &self.forwarded_portnums {
            if !(0..=PortNum::MAX_VALUE).contains(p) {
                return Err(MeshBridgeError::BadConfig(format!(
                    "forwarded_portnums entry {p} out of range 0..={}",
                    PortNum::MAX_VALUE
                )));
            }
        }

        if self.namespaces.len() < 2 {
            return Err(MeshBridgeError::BadConfig(
                "at least two namespaces are required to bridge".into(),
            ));
        }
        let mut seen = HashSet::new();
        for ns in &self.namespaces {
            ns.validate()?;
            if !seen.insert(ns.topic.as_str()) {
                return Err(MeshBridgeError::BadConfig(format!(
                    "duplicate namespace topic: {}",
                    ns.topic
                )));
            }
        }
        // a prefix of another namespace would make origin resolution ambiguous
        for a in &self.namespaces {
            for b in &self.namespaces {
                if a.topic != b.topic && b.topic.starts_with(&format!("{}/", a.topic)) {
                    return Err(MeshBridgeError::BadConfig(format!(
                        "namespace {} is nested inside {}",
                        b.topic, a.topic
                    )));
                }
            }
        }

        self.relay.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerSection {
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
}

impl BrokerSection {
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(MeshBridgeError::BadConfig("broker.address must not be empty".into()));
        }
        if self.port == 0 {
            return Err(MeshBridgeError::BadConfig("broker.port must not be 0".into()));
        }
        if self.password.is_some() && self.user.is_none() {
            return Err(MeshBridgeError::BadConfig(
                "broker.password requires broker.user".into(),
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(MeshBridgeError::BadConfig("broker.client_id must not be empty".into()));
        }
        if !(5..=3600).contains(&self.keepalive_secs) {
            return Err(MeshBridgeError::BadConfig(
                "broker.keepalive_secs must be between 5 and 3600".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Topic prefix, e.g. `msh/US/BRIDGE/2/e/LongFast`.
    pub topic: String,

    /// Appended to relayed node-info long names originating here.
    #[serde(default)]
    pub nickname: Option<String>,

    /// Overrides the shared key for this namespace.
    #[serde(default)]
    pub key: Option<String>,
}

impl NamespaceConfig {
    pub fn validate(&self) -> Result<()> {
        let t = self.topic.as_str();
        if t.is_empty() || t.starts_with('/') || t.ends_with('/') {
            return Err(MeshBridgeError::BadConfig(format!(
                "namespace topic {t:?} must be non-empty without leading or trailing '/'"
            )));
        }
        if t.contains('#') || t.contains('+') {
            return Err(MeshBridgeError::BadConfig(format!(
                "namespace topic {t:?} must not contain wildcards"
            )));
        }
        if t.split('/').any(str::is_empty) {
            return Err(MeshBridgeError::BadConfig(format!(
                "namespace topic {t:?} has an empty segment"
            )));
        }
        if let Some(k) = &self.key {
            ChannelKey::parse(k)
                .map_err(|e| MeshBridgeError::BadConfig(format!("namespace {t} key: {e}")))?;
        }
        Ok(())
    }

    /// Preset (channel) name: the last topic segment.
    pub fn preset(&self) -> &str {
        self.topic.rsplit('/').next().unwrap_or(&self.topic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKeyMode {
    /// Sender + packet id, checked before decryption.
    MessageId,
    /// Decoded payload bytes, checked after decryption.
    Payload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    #[serde(default = "default_dedup_key")]
    pub dedup_key: DedupKeyMode,

    /// 0 disables throttling.
    #[serde(default)]
    pub rate_limit_rps: u32,

    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            dedup_capacity: default_dedup_capacity(),
            dedup_window_ms: default_dedup_window_ms(),
            dedup_key: default_dedup_key(),
            rate_limit_rps: 0,
            rate_limit_burst: default_rate_limit_burst(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=10_000).contains(&self.dedup_capacity) {
            return Err(MeshBridgeError::BadConfig(
                "relay.dedup_capacity must be between 1 and 10000".into(),
            ));
        }
        if !(100..=600_000).contains(&self.dedup_window_ms) {
            return Err(MeshBridgeError::BadConfig(
                "relay.dedup_window_ms must be between 100 and 600000".into(),
            ));
        }
        if self.rate_limit_rps > 0 && self.rate_limit_burst == 0 {
            return Err(MeshBridgeError::BadConfig(
                "relay.rate_limit_burst must be at least 1 when rate limiting".into(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(MeshBridgeError::BadConfig("relay.queue_depth must be at least 1".into()));
        }
        Ok(())
    }
}

fn default_key() -> String {
    "AQ==".into()
}
fn default_hop_modifier() -> u32 {
    1
}
fn default_forwarded_portnums() -> Vec<i32> {
    vec![1, 3, 4, 5, 6, 8, 70]
}
fn default_port() -> u16 {
    1883
}
fn default_client_id() -> String {
    "meshbridge".into()
}
fn default_keepalive_secs() -> u64 {
    60
}
fn default_dedup_capacity() -> usize {
    100
}
fn default_dedup_window_ms() -> u64 {
    5000
}
fn default_dedup_key() -> DedupKeyMode {
    DedupKeyMode::MessageId
}
fn default_rate_limit_burst() -> u32 {
    10
}
fn default_queue_depth() -> usize {
    1024
}
