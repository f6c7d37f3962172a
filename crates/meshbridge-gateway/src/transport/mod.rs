//! Bus transport (MQTT).
//!
//! The event loop task owns the broker connection and feeds inbound
//! publishes to a single relay worker over a bounded channel; the worker
//! publishes through a cloned client handle so the event loop never stalls.

pub mod mqtt;

pub use mqtt::{run, MqttPublisher, TransportError};
