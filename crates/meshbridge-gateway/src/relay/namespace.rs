//! Resolved bridged namespaces.

use meshbridge_core::crypto::{channel_hash, ChannelKey};
use meshbridge_core::error::{MeshBridgeError, Result};

use crate::config::{BridgeConfig, NamespaceConfig};

/// A bridged topic prefix with its key material resolved.
#[derive(Debug, Clone)]
pub struct Namespace {
    /// Topic prefix without trailing slash.
    pub topic: String,
    /// Channel (preset) name, the last segment of `topic`.
    pub preset: String,
    pub nickname: Option<String>,
    pub key: ChannelKey,
}

impl Namespace {
    pub fn new(cfg: &NamespaceConfig, shared_key: &ChannelKey) -> Result<Self> {
        let key = match &cfg.key {
            Some(k) => ChannelKey::parse(k)?,
            None => shared_key.clone(),
        };
        Ok(Self {
            topic: cfg.topic.clone(),
            preset: cfg.preset().to_string(),
            nickname: cfg
                .nickname
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            key,
        })
    }

    /// Resolve every namespace in config order.
    pub fn from_config(cfg: &BridgeConfig) -> Result<Vec<Self>> {
        let shared = ChannelKey::parse(&cfg.key)
            .map_err(|e| MeshBridgeError::BadConfig(format!("key: {e}")))?;
        cfg.namespaces.iter().map(|ns| Self::new(ns, &shared)).collect()
    }

    /// True if `topic` lies under this prefix.
    pub fn contains(&self, topic: &str) -> bool {
        topic
            .strip_prefix(self.topic.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Wildcard subscription covering every sub-topic.
    pub fn subscription(&self) -> String {
        format!("{}/#", self.topic)
    }

    /// Channel number packets carry inside this namespace.
    pub fn channel(&self) -> u32 {
        channel_hash(&self.preset, self.key.as_bytes())
    }
}

/// Gateway id: the trailing segment of a received topic.
pub fn gateway_id(topic: &str) -> &str {
    topic.rsplit('/').next().unwrap_or(topic)
}
