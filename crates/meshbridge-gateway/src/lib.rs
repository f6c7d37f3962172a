//! meshbridge gateway library entry.
//!
//! This crate wires config, the relay pipeline, observability and the MQTT
//! transport into a running bridge. It is consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod bus;
pub mod config;
pub mod obs;
pub mod policy;
pub mod relay;
pub mod transport;
