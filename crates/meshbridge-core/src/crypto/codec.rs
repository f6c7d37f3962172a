//! AES-CTR payload codec.
//!
//! Nonce layout (16 bytes): packet id as u64 little-endian, then sender node
//! id as u64 little-endian. The counter is the full 128-bit block, big-endian.
//! The nonce is a pure function of packet identity, so a (packet id, sender)
//! pair must never be reused with different plaintext under one key.

use aes::{Aes128, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use prost::Message;

use super::channel::{channel_hash, ChannelKey};
use crate::error::{MeshBridgeError, Result};
use crate::protocol::{Data, MeshPacket};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Build the CTR nonce for a packet.
pub fn nonce(packet_id: u64, sender: u64) -> [u8; 16] {
    let mut n = [0u8; 16];
    n[..8].copy_from_slice(&packet_id.to_le_bytes());
    n[8..].copy_from_slice(&sender.to_le_bytes());
    n
}

fn packet_nonce(packet: &MeshPacket) -> [u8; 16] {
    nonce(u64::from(packet.id), u64::from(packet.from))
}

/// Apply the keystream in place. Encryption and decryption are the same op.
pub fn apply_keystream(key: &ChannelKey, nonce: &[u8; 16], buf: &mut [u8]) -> Result<()> {
    match key {
        ChannelKey::None => Err(MeshBridgeError::InvalidKey("no key configured".into())),
        ChannelKey::Aes128(k) => {
            let mut c = Aes128Ctr::new_from_slices(k, nonce)
                .map_err(|e| MeshBridgeError::InvalidKey(e.to_string()))?;
            c.apply_keystream(buf);
            Ok(())
        }
        ChannelKey::Aes256(k) => {
            let mut c = Aes256Ctr::new_from_slices(k, nonce)
                .map_err(|e| MeshBridgeError::InvalidKey(e.to_string()))?;
            c.apply_keystream(buf);
            Ok(())
        }
    }
}

/// Decrypt a packet's ciphertext into its decoded payload.
///
/// A payload that does not decode after decryption means a wrong key or
/// corrupt data; both are reported as `DecryptionFailure`.
pub fn decrypt(packet: &MeshPacket, key: &ChannelKey) -> Result<Data> {
    let ciphertext = packet
        .encrypted()
        .ok_or_else(|| MeshBridgeError::DecryptionFailure("packet is not encrypted".into()))?;
    if !key.is_enabled() {
        return Err(MeshBridgeError::DecryptionFailure(
            "encrypted packet but no key configured".into(),
        ));
    }

    let mut buf = ciphertext.to_vec();
    apply_keystream(key, &packet_nonce(packet), &mut buf)
        .map_err(|e| MeshBridgeError::DecryptionFailure(e.to_string()))?;

    Data::decode(buf.as_slice()).map_err(|e| {
        MeshBridgeError::DecryptionFailure(format!(
            "payload did not decode (wrong key?) id={} from={:#010x}: {e}",
            packet.id, packet.from
        ))
    })
}

/// Encrypt `data` for the channel `destination`, stamping the channel hash
/// onto `packet` first. Returns the ciphertext; never falls back to cleartext.
pub fn encrypt(
    destination: &str,
    key: &ChannelKey,
    packet: &mut MeshPacket,
    data: &Data,
) -> Result<Vec<u8>> {
    if !key.is_enabled() {
        return Err(MeshBridgeError::EncryptionFailure(format!(
            "no key configured for {destination}"
        )));
    }
    packet.channel = channel_hash(destination, key.as_bytes());

    let mut buf = data.encode_to_vec();
    apply_keystream(key, &packet_nonce(packet), &mut buf)
        .map_err(|e| MeshBridgeError::EncryptionFailure(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::crypto::channel::DEFAULT_KEY;
    use crate::protocol::PayloadVariant;
    use proptest::prelude::*;

    fn packet(id: u32, from: u32) -> MeshPacket {
        MeshPacket {
            id,
            from,
            to: 0xffff_ffff,
            ..Default::default()
        }
    }

    fn text(msg: &[u8]) -> Data {
        Data {
            portnum: 1,
            payload: msg.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn nonce_layout_is_little_endian() {
        let n = nonce(0x0102_0304, 0xa1b2_c3d4);
        assert_eq!(
            n,
            [
                0x04, 0x03, 0x02, 0x01, 0, 0, 0, 0, //
                0xd4, 0xc3, 0xb2, 0xa1, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn encrypt_sets_destination_channel() {
        let key = ChannelKey::Aes128(DEFAULT_KEY);
        let mut p = packet(7, 9);
        p.channel = 99;
        encrypt("LongFast", &key, &mut p, &text(b"hi")).unwrap();
        assert_eq!(p.channel, 8);
    }

    #[test]
    fn encrypt_without_key_fails() {
        let mut p = packet(7, 9);
        let err = encrypt("LongFast", &ChannelKey::None, &mut p, &text(b"hi")).unwrap_err();
        assert_eq!(err.code().as_str(), "ENCRYPTION_FAILURE");
    }

    #[test]
    fn decrypt_cleartext_packet_fails() {
        let mut p = packet(7, 9);
        p.payload_variant = Some(PayloadVariant::Decoded(text(b"hi")));
        let err = decrypt(&p, &ChannelKey::Aes128(DEFAULT_KEY)).unwrap_err();
        assert_eq!(err.code().as_str(), "DECRYPTION_FAILURE");
    }

    #[test]
    fn decrypt_without_key_fails() {
        let mut p = packet(7, 9);
        p.payload_variant = Some(PayloadVariant::Encrypted(vec![1, 2, 3]));
        assert!(decrypt(&p, &ChannelKey::None).is_err());
    }

    #[test]
    fn nonce_depends_on_identity() {
        let key = ChannelKey::Aes128(DEFAULT_KEY);
        let data = text(b"same plaintext");
        let a = encrypt("LongFast", &key, &mut packet(1, 9), &data).unwrap();
        let b = encrypt("LongFast", &key, &mut packet(2, 9), &data).unwrap();
        let c = encrypt("LongFast", &key, &mut packet(1, 10), &data).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    proptest! {
        /// decrypt(encrypt(x)) == x for either key size
        #[test]
        fn round_trip(
            id in any::<u32>(),
            from in any::<u32>(),
            portnum in 0i32..512,
            payload in proptest::collection::vec(any::<u8>(), 0..200),
            wide in any::<bool>(),
            seed in any::<u8>(),
        ) {
            let key = if wide {
                ChannelKey::Aes256([seed; 32])
            } else {
                ChannelKey::Aes128([seed; 16])
            };
            let data = Data { portnum, payload, ..Default::default() };
            let mut p = packet(id, from);
            let ct = encrypt("MediumFast", &key, &mut p, &data).unwrap();
            p.payload_variant = Some(PayloadVariant::Encrypted(ct));
            prop_assert_eq!(decrypt(&p, &key).unwrap(), data);
        }
    }
}
