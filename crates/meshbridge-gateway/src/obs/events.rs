//! Relay outcome events and the sink they are emitted to.

use std::fmt;

use meshbridge_core::hops::HopFields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardAction {
    Forwarded,
    Failed(String),
}

/// One destination of a fan-out.
#[derive(Debug, Clone)]
pub struct ForwardedEvent {
    pub from_topic: String,
    pub to_topic: String,
    pub portnum: String,
    pub from_channel: u32,
    pub to_channel: u32,
    pub from_hops: HopFields,
    pub to_hops: HopFields,
    pub payload: String,
    pub action: ForwardAction,
}

/// A decoded message that was not relayed because of its portnum.
#[derive(Debug, Clone)]
pub struct SkippedEvent {
    pub from_topic: String,
    pub portnum: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub enum RelayEvent {
    Forwarded(ForwardedEvent),
    Skipped(SkippedEvent),
}

/// Destination for relay outcome events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RelayEvent);
}

impl fmt::Display for ForwardedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [CH {} | HL {} | HS {}] -> {} [CH {} | HL {} | HS {}] {}: {}",
            self.from_topic,
            self.from_channel,
            self.from_hops.hop_limit,
            self.from_hops.hop_start,
            self.to_topic,
            self.to_channel,
            self.to_hops.hop_limit,
            self.to_hops.hop_start,
            self.portnum,
            self.payload,
        )
    }
}

/// Default sink: structured `tracing` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &RelayEvent) {
        match event {
            RelayEvent::Forwarded(ev) => match &ev.action {
                ForwardAction::Forwarded => tracing::info!(
                    from_topic = %ev.from_topic,
                    to_topic = %ev.to_topic,
                    portnum = %ev.portnum,
                    from_channel = ev.from_channel,
                    to_channel = ev.to_channel,
                    from_hop_limit = ev.from_hops.hop_limit,
                    to_hop_limit = ev.to_hops.hop_limit,
                    from_hop_start = ev.from_hops.hop_start,
                    to_hop_start = ev.to_hops.hop_start,
                    action = "Forwarded",
                    "{ev}"
                ),
                ForwardAction::Failed(reason) => tracing::error!(
                    from_topic = %ev.from_topic,
                    to_topic = %ev.to_topic,
                    portnum = %ev.portnum,
                    %reason,
                    action = "Failed",
                    "failed to forward message"
                ),
            },
            RelayEvent::Skipped(ev) => tracing::info!(
                from_topic = %ev.from_topic,
                portnum = %ev.portnum,
                reason = %ev.reason,
                action = "Skipped",
                "message not relayed"
            ),
        }
    }
}
