//! Packet relay engine.
//!
//! `Relay` runs the per-message pipeline: parse, dedup, decrypt, hop
//! rewrite, port filter, preview, node-info tagging, then fan-out with
//! per-destination re-encryption and publish.

pub mod namespace;
pub mod orchestrator;

pub use namespace::Namespace;
pub use orchestrator::{Relay, RelayOutcome};
