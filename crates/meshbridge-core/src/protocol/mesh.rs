//! MQTT envelope and radio packet records.
//!
//! Field numbers and scalar encodings follow the externally defined
//! Meshtastic schema (`mqtt.proto`, `mesh.proto`). Only the fields the relay
//! reads or must carry through are declared. prost drops undeclared fields
//! on re-encode, so every field of the current schema is listed even when the
//! relay never reads it.

use prost::Message;

use crate::error::{MeshBridgeError, Result};

/// Outer record published on the bus.
#[derive(Clone, PartialEq, Message)]
pub struct ServiceEnvelope {
    /// The radio packet.
    #[prost(message, optional, tag = "1")]
    pub packet: Option<MeshPacket>,
    /// Channel (preset) name the packet belongs to.
    #[prost(string, tag = "2")]
    pub channel_id: String,
    /// Node id of the gateway that uplinked the packet (e.g. `!a1b2c3d4`).
    #[prost(string, tag = "3")]
    pub gateway_id: String,
}

impl ServiceEnvelope {
    /// Decode an envelope from bus bytes.
    pub fn decode_bytes(buf: &[u8]) -> Result<Self> {
        ServiceEnvelope::decode(buf).map_err(|e| MeshBridgeError::MalformedEnvelope(e.to_string()))
    }

    /// Decode and require a packet carrying a payload variant.
    pub fn decode_with_packet(buf: &[u8]) -> Result<(Self, MeshPacket)> {
        let mut env = Self::decode_bytes(buf)?;
        let packet = env
            .packet
            .take()
            .ok_or_else(|| MeshBridgeError::MalformedEnvelope("envelope has no packet".into()))?;
        if packet.payload_variant.is_none() {
            return Err(MeshBridgeError::MalformedEnvelope(
                "packet has neither decoded nor encrypted payload".into(),
            ));
        }
        Ok((env, packet))
    }
}

/// A mesh radio packet.
#[derive(Clone, PartialEq, Message)]
pub struct MeshPacket {
    /// Sender node number.
    #[prost(fixed32, tag = "1")]
    pub from: u32,
    /// Destination node number (`0xffffffff` for broadcast).
    #[prost(fixed32, tag = "2")]
    pub to: u32,
    /// Channel hash on the air / MQTT.
    #[prost(uint32, tag = "3")]
    pub channel: u32,
    #[prost(oneof = "PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<PayloadVariant>,
    /// Message id, unique per sender.
    #[prost(fixed32, tag = "6")]
    pub id: u32,
    #[prost(fixed32, tag = "7")]
    pub rx_time: u32,
    #[prost(float, tag = "8")]
    pub rx_snr: f32,
    /// Remaining hop budget.
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
    #[prost(int32, tag = "11")]
    pub priority: i32,
    #[prost(int32, tag = "12")]
    pub rx_rssi: i32,
    /// Deprecated `Delayed` enum, carried through.
    #[prost(int32, tag = "13")]
    pub delayed: i32,
    #[prost(bool, tag = "14")]
    pub via_mqtt: bool,
    /// Initial hop budget, `0` when the sender firmware predates the field.
    #[prost(uint32, tag = "15")]
    pub hop_start: u32,
    #[prost(bytes = "vec", tag = "16")]
    pub public_key: Vec<u8>,
    #[prost(bool, tag = "17")]
    pub pki_encrypted: bool,
    /// Low byte of the next-hop node for directed routing.
    #[prost(uint32, tag = "18")]
    pub next_hop: u32,
    /// Low byte of the node that last rebroadcast the packet.
    #[prost(uint32, tag = "19")]
    pub relay_node: u32,
    #[prost(uint32, tag = "20")]
    pub tx_after: u32,
    #[prost(int32, tag = "21")]
    pub transport_mechanism: i32,
}

/// Exactly one of cleartext or ciphertext is present on a packet.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum PayloadVariant {
    #[prost(message, tag = "4")]
    Decoded(Data),
    #[prost(bytes, tag = "5")]
    Encrypted(Vec<u8>),
}

impl MeshPacket {
    /// Cleartext payload, if the packet carries one.
    pub fn decoded(&self) -> Option<&Data> {
        match &self.payload_variant {
            Some(PayloadVariant::Decoded(d)) => Some(d),
            _ => None,
        }
    }

    /// Ciphertext, if the packet carries one.
    pub fn encrypted(&self) -> Option<&[u8]> {
        match &self.payload_variant {
            Some(PayloadVariant::Encrypted(b)) => Some(b.as_slice()),
            _ => None,
        }
    }
}

/// Decoded application payload.
#[derive(Clone, PartialEq, Message)]
pub struct Data {
    /// Application port (see [`crate::protocol::PortNum`]).
    #[prost(int32, tag = "1")]
    pub portnum: i32,
    /// Portnum-specific bytes.
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(bool, tag = "3")]
    pub want_response: bool,
    #[prost(fixed32, tag = "4")]
    pub dest: u32,
    #[prost(fixed32, tag = "5")]
    pub source: u32,
    #[prost(fixed32, tag = "6")]
    pub request_id: u32,
    #[prost(fixed32, tag = "7")]
    pub reply_id: u32,
    #[prost(fixed32, tag = "8")]
    pub emoji: u32,
    #[prost(uint32, optional, tag = "9")]
    pub bitfield: Option<u32>,
}
