//! Meshtastic wire records and per-portnum payload helpers.
//!
//! - `mesh`: the MQTT `ServiceEnvelope`, the radio `MeshPacket` and the
//!   decoded `Data` payload (protobuf, via `prost`).
//! - `apps`: application payloads decoded only for observability.
//! - `portnum`: the application-port discriminant table.
//! - `preview`: portnum -> payload decoder lookup for log previews.
//!
//! All decoders are panic-free: malformed input is reported as
//! `MeshBridgeError` instead of panicking, so the relay stays up under
//! hostile bus traffic.

pub mod apps;
pub mod mesh;
pub mod portnum;
pub mod preview;

pub use mesh::{Data, MeshPacket, PayloadVariant, ServiceEnvelope};
pub use portnum::PortNum;
