//! Shared application state for the bridge.
//!
//! Builds the relay from a validated config and runs startup sanity checks.
//! Startup errors are explicit (Result instead of panic).

use std::sync::Arc;

use meshbridge_core::error::{MeshBridgeError, Result};
use meshbridge_core::protocol::PortNum;

use crate::config::BridgeConfig;
use crate::obs::{EventSink, RelayMetrics, TracingSink};
use crate::relay::Relay;

const FAIL_FAST_ON_UNKNOWN_PORTNUM: bool = false; // if changed to true, boot fails.

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    relay: Arc<Relay>,
}

struct AppStateInner {
    cfg: BridgeConfig,
}

impl AppState {
    /// Build application state with the default tracing sink.
    pub fn new(cfg: BridgeConfig) -> Result<Self> {
        Self::with_sink(cfg, Arc::new(TracingSink))
    }

    pub fn with_sink(cfg: BridgeConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        // forwarded portnums <-> known table sanity check
        for p in &cfg.forwarded_portnums {
            if PortNum::from_i32(*p).is_none() {
                tracing::warn!(portnum = p, "forwarded_portnums refers to an unknown portnum");
                if FAIL_FAST_ON_UNKNOWN_PORTNUM {
                    return Err(MeshBridgeError::BadConfig(format!(
                        "forwarded_portnums references unknown portnum: {p}"
                    )));
                }
            }
        }

        let metrics = Arc::new(RelayMetrics::default());
        let relay = Relay::from_config(&cfg, sink, metrics)?;

        for ns in relay.namespaces() {
            tracing::info!(
                topic = %ns.topic,
                preset = %ns.preset,
                channel = ns.channel(),
                encrypted = ns.key.is_enabled(),
                nickname = ns.nickname.as_deref().unwrap_or(""),
                "bridging namespace"
            );
        }
        tracing::info!(ports = ?relay.ports().describe(), hop_modifier = cfg.hop_modifier, "relay policy");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            relay: Arc::new(relay),
        })
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.inner.cfg
    }

    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.relay)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        self.relay.metrics()
    }
}
