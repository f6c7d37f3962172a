use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use prost::Message;

use meshbridge_core::crypto;
use meshbridge_core::dedup::{DedupKey, RecentMessages};
use meshbridge_core::error::{MeshBridgeError, Result};
use meshbridge_core::hops::HopFields;
use meshbridge_core::protocol::apps::User;
use meshbridge_core::protocol::{preview, Data, MeshPacket, PayloadVariant, PortNum, ServiceEnvelope};

use super::namespace::{gateway_id, Namespace};
use crate::bus::Publisher;
use crate::config::{BridgeConfig, DedupKeyMode};
use crate::obs::{EventSink, ForwardAction, ForwardedEvent, RelayEvent, RelayMetrics, SkippedEvent};
use crate::policy::PortFilter;

/// What happened to one inbound message.
#[derive(Debug, Clone)]
pub enum RelayOutcome {
    /// Parse, namespace or decrypt failure. Not retried.
    Dropped(MeshBridgeError),
    /// Already relayed within the dedup window.
    Duplicate,
    /// Portnum not in the forwarded set.
    Skipped { portnum: i32 },
    /// Fan-out ran; `published <= attempted`.
    Relayed { attempted: usize, published: usize },
}

/// The relay pipeline. One instance per process; messages are handled one
/// at a time by the transport worker.
pub struct Relay {
    namespaces: Vec<Namespace>,
    ports: PortFilter,
    hop_modifier: u32,
    dedup_mode: DedupKeyMode,
    recent: Mutex<RecentMessages>,
    sink: Arc<dyn EventSink>,
    metrics: Arc<RelayMetrics>,
}

impl Relay {
    pub fn new(
        namespaces: Vec<Namespace>,
        ports: PortFilter,
        hop_modifier: u32,
        dedup_mode: DedupKeyMode,
        recent: RecentMessages,
        sink: Arc<dyn EventSink>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            namespaces,
            ports,
            hop_modifier,
            dedup_mode,
            recent: Mutex::new(recent),
            sink,
            metrics,
        }
    }

    /// Build from a validated config.
    pub fn from_config(
        cfg: &BridgeConfig,
        sink: Arc<dyn EventSink>,
        metrics: Arc<RelayMetrics>,
    ) -> Result<Self> {
        let recent = RecentMessages::new(
            cfg.relay.dedup_capacity,
            Duration::from_millis(cfg.relay.dedup_window_ms),
        );
        Ok(Self::new(
            Namespace::from_config(cfg)?,
            PortFilter::new(&cfg.forwarded_portnums),
            cfg.hop_modifier,
            cfg.relay.dedup_key,
            recent,
            sink,
            metrics,
        ))
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn ports(&self) -> &PortFilter {
        &self.ports
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub async fn handle(&self, topic: &str, payload: &[u8], bus: &dyn Publisher) -> RelayOutcome {
        self.handle_at(topic, payload, bus, Instant::now()).await
    }

    /// Run the pipeline for one inbound message with an explicit clock.
    pub async fn handle_at(
        &self,
        topic: &str,
        payload: &[u8],
        bus: &dyn Publisher,
        now: Instant,
    ) -> RelayOutcome {
        self.metrics.received.inc(&[]);

        let Some((origin_idx, origin)) = self
            .namespaces
            .iter()
            .enumerate()
            .find(|(_, ns)| ns.contains(topic))
        else {
            return self.reject(topic, MeshBridgeError::UnknownNamespace(topic.to_string()));
        };

        // immutable origin view; outbound packets are cloned from it per destination
        let (envelope, packet) = match ServiceEnvelope::decode_with_packet(payload) {
            Ok(v) => v,
            Err(e) => return self.reject(topic, e),
        };

        if self.dedup_mode == DedupKeyMode::MessageId {
            let key = DedupKey::MessageId {
                from: packet.from,
                id: packet.id,
            };
            if self.is_duplicate(key, None, now) {
                return self.duplicate(topic, &packet);
            }
        }

        let data = match &packet.payload_variant {
            Some(PayloadVariant::Decoded(d)) => d.clone(),
            _ => match crypto::decrypt(&packet, &origin.key) {
                Ok(d) => d,
                Err(e) => return self.reject(topic, e),
            },
        };

        // the republished payload differs from the inbound one when tagged,
        // so both identities must be remembered to catch our own echo
        let tagged = tagged_nodeinfo(origin, &data);
        if self.dedup_mode == DedupKeyMode::Payload {
            let alias = tagged.clone().map(DedupKey::Payload);
            if self.is_duplicate(DedupKey::Payload(data.payload.clone()), alias, now) {
                return self.duplicate(topic, &packet);
            }
        }

        let from_hops = HopFields::new(packet.hop_limit, packet.hop_start);
        let to_hops = from_hops.rewrite(self.hop_modifier);

        let portnum_name = PortNum::name_of(data.portnum);
        if !self.ports.is_forwarded(data.portnum) {
            self.metrics.skipped.inc(&[("portnum", &portnum_name)]);
            self.sink.emit(&RelayEvent::Skipped(SkippedEvent {
                from_topic: topic.to_string(),
                portnum: portnum_name,
                reason: "portnum not forwarded".into(),
            }));
            return RelayOutcome::Skipped {
                portnum: data.portnum,
            };
        }

        let preview = preview::preview(data.portnum, &data.payload);
        let data = match tagged {
            Some(payload) => Data { payload, ..data },
            None => data,
        };

        let gateway = match gateway_id(topic) {
            "" => envelope.gateway_id.as_str(),
            g => g,
        };
        let from_channel = origin.channel();

        let mut attempted = 0;
        let mut published = 0;
        for (idx, dest) in self.namespaces.iter().enumerate() {
            if idx == origin_idx {
                continue;
            }
            attempted += 1;

            let to_topic = format!("{}/{}", dest.topic, gateway);
            let mut out = packet.clone();
            out.hop_limit = to_hops.hop_limit;
            out.hop_start = to_hops.hop_start;

            let projected = project(dest, &mut out, &data);
            let to_channel = out.channel;
            let result = match projected {
                Ok(()) => {
                    let env = ServiceEnvelope {
                        packet: Some(out),
                        channel_id: dest.preset.clone(),
                        gateway_id: gateway.to_string(),
                    };
                    bus.publish(&to_topic, env.encode_to_vec()).await
                }
                Err(e) => Err(e),
            };

            let action = match result {
                Ok(()) => {
                    published += 1;
                    self.metrics.forwarded.inc(&[("to", &dest.preset)]);
                    ForwardAction::Forwarded
                }
                Err(e) => {
                    self.metrics.publish_failures.inc(&[("to", &dest.preset), ("code", e.code().as_str())]);
                    ForwardAction::Failed(e.to_string())
                }
            };

            self.sink.emit(&RelayEvent::Forwarded(ForwardedEvent {
                from_topic: topic.to_string(),
                to_topic,
                portnum: portnum_name.clone(),
                from_channel,
                to_channel,
                from_hops,
                to_hops,
                payload: preview.clone(),
                action,
            }));
        }

        RelayOutcome::Relayed {
            attempted,
            published,
        }
    }

    /// Check `key` and record it. `alias` is recorded alongside under the
    /// same lock when `key` is new.
    fn is_duplicate(&self, key: DedupKey, alias: Option<DedupKey>, now: Instant) -> bool {
        let mut recent = match self.recent.lock() {
            Ok(recent) => recent,
            Err(poisoned) => {
                tracing::warn!("dedup cache lock poisoned; recovering");
                poisoned.into_inner()
            }
        };
        if recent.check_and_record(key, now) {
            return true;
        }
        if let Some(alias) = alias {
            recent.record(alias, now);
        }
        false
    }

    fn duplicate(&self, topic: &str, packet: &MeshPacket) -> RelayOutcome {
        self.metrics.duplicates.inc(&[]);
        tracing::debug!(topic, id = packet.id, from = packet.from, "duplicate message dropped");
        RelayOutcome::Duplicate
    }

    fn reject(&self, topic: &str, err: MeshBridgeError) -> RelayOutcome {
        let code = err.code().as_str();
        self.metrics.dropped.inc(&[("code", code)]);
        match &err {
            MeshBridgeError::DecryptionFailure(_) => {
                tracing::error!(topic, code, error = %err, "decryption failed; skipping message")
            }
            _ => tracing::warn!(topic, code, error = %err, "message dropped"),
        }
        RelayOutcome::Dropped(err)
    }
}

/// Re-project the payload for a destination: ciphertext under its key, or
/// cleartext when the destination has none.
fn project(dest: &Namespace, out: &mut MeshPacket, data: &Data) -> Result<()> {
    if dest.key.is_enabled() {
        let ciphertext = crypto::encrypt(&dest.preset, &dest.key, out, data)?;
        out.payload_variant = Some(PayloadVariant::Encrypted(ciphertext));
    } else {
        out.channel = dest.channel();
        out.payload_variant = Some(PayloadVariant::Decoded(data.clone()));
    }
    Ok(())
}

/// Node-info payload with the origin nickname appended to the long name, or
/// `None` when nothing changes.
fn tagged_nodeinfo(origin: &Namespace, data: &Data) -> Option<Vec<u8>> {
    let nickname = origin.nickname.as_deref()?;
    if data.portnum != PortNum::NodeinfoApp as i32 {
        return None;
    }
    match User::decode(data.payload.as_slice()) {
        Ok(mut user) => user.tag_long_name(nickname).then(|| user.encode_to_vec()),
        Err(e) => {
            tracing::debug!(error = %e, "node-info payload did not decode; forwarding untouched");
            None
        }
    }
}
