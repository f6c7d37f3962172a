//! Known-answer vectors for envelope decoding and the AES-CTR codec.
//!
//! Ciphertexts were produced by an independent AES-CTR implementation with
//! the same nonce layout, so these pin byte order and counter width.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use meshbridge_core::crypto::{self, ChannelKey};
use meshbridge_core::protocol::{PayloadVariant, ServiceEnvelope};

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn codec_vectors() {
    let files = [
        "codec_default_key_text.json",
        "codec_aes256_position.json",
        "codec_wrong_key.json",
        "envelope_cleartext.json",
        "envelope_truncated.json",
    ];

    for f in files {
        let v = load(f);
        let key = ChannelKey::parse(&v.key).unwrap();
        let raw = v.frame.decode();

        let res = ServiceEnvelope::decode_with_packet(&raw).and_then(|(env, packet)| {
            let data = match &packet.payload_variant {
                Some(PayloadVariant::Decoded(d)) => d.clone(),
                _ => crypto::decrypt(&packet, &key)?,
            };
            Ok((env, packet, data))
        });

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let (env, packet, data) = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(packet.from as u64, ex["from"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(packet.id as u64, ex["id"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(packet.channel as u64, ex["channel"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(packet.hop_limit as u64, ex["hop_limit"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(packet.hop_start as u64, ex["hop_start"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(env.channel_id, ex["channel_id"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(env.gateway_id, ex["gateway_id"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(data.portnum as u64, ex["portnum"].as_u64().unwrap(), "vector={}", v.description);

        if let Some(text) = ex.get("payload_utf8").and_then(|t| t.as_str()) {
            assert_eq!(String::from_utf8(data.payload.clone()).unwrap(), text, "vector={}", v.description);
        }
        if let Some(hex_payload) = ex.get("payload_hex").and_then(|t| t.as_str()) {
            assert_eq!(hex::encode(&data.payload), hex_payload, "vector={}", v.description);
        }

        // re-encrypting for the same channel must reproduce the wire bytes
        if let Some(ct) = ex.get("ciphertext").and_then(|t| t.as_str()) {
            let mut out = packet.clone();
            out.channel = 0;
            let again = crypto::encrypt(&env.channel_id, &key, &mut out, &data).unwrap();
            assert_eq!(hex::encode(again), ct, "vector={}", v.description);
            assert_eq!(out.channel, packet.channel, "vector={}", v.description);
        }
    }
}
