//! Channel key parsing and channel hash derivation.

use std::fmt;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{MeshBridgeError, Result};

/// Well-known Meshtastic default channel key (`1PG7OiApB1nwvP+rz05pAQ==`).
pub const DEFAULT_KEY: [u8; 16] = [
    0xd4, 0xf1, 0xbb, 0x3a, 0x20, 0x29, 0x07, 0x59, 0xf0, 0xbc, 0xff, 0xab, 0xcf, 0x4e, 0x69, 0x01,
];

const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw channel key material.
#[derive(Clone, PartialEq, Eq)]
pub enum ChannelKey {
    /// Channel is unencrypted; payloads travel as cleartext.
    None,
    Aes128([u8; 16]),
    Aes256([u8; 32]),
}

impl ChannelKey {
    /// Decode a transport-encoded key (base64, URL-safe alphabet accepted).
    ///
    /// Single-byte keys use the firmware shorthand: `0` disables encryption,
    /// `N` selects the default key with its last byte bumped by `N - 1`.
    pub fn parse(transport: &str) -> Result<Self> {
        let s = transport.trim();
        if s.is_empty() {
            return Ok(ChannelKey::None);
        }
        let normalized = s.replace('-', "+").replace('_', "/");
        let raw = KEY_ENGINE
            .decode(normalized.as_bytes())
            .map_err(|e| MeshBridgeError::InvalidKey(format!("base64: {e}")))?;
        Self::from_bytes(&raw)
    }

    /// Build from already decoded bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        match raw.len() {
            0 => Ok(ChannelKey::None),
            1 => Ok(Self::from_short(raw[0])),
            16 => {
                let mut k = [0u8; 16];
                k.copy_from_slice(raw);
                Ok(ChannelKey::Aes128(k))
            }
            32 => {
                let mut k = [0u8; 32];
                k.copy_from_slice(raw);
                Ok(ChannelKey::Aes256(k))
            }
            n => Err(MeshBridgeError::InvalidKey(format!(
                "key must be 0, 1, 16 or 32 bytes, got {n}"
            ))),
        }
    }

    fn from_short(index: u8) -> Self {
        if index == 0 {
            return ChannelKey::None;
        }
        let mut k = DEFAULT_KEY;
        k[15] = k[15].wrapping_add(index - 1);
        tracing::debug!(index, "expanded short channel key");
        ChannelKey::Aes128(k)
    }

    /// Raw key bytes (empty for [`ChannelKey::None`]).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ChannelKey::None => &[],
            ChannelKey::Aes128(k) => k,
            ChannelKey::Aes256(k) => k,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ChannelKey::None)
    }
}

impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::None => f.write_str("ChannelKey::None"),
            ChannelKey::Aes128(_) => f.write_str("ChannelKey::Aes128(..)"),
            ChannelKey::Aes256(_) => f.write_str("ChannelKey::Aes256(..)"),
        }
    }
}

fn xor_fold(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Channel number for a preset name under a key: XOR-fold of the name bytes
/// XOR the XOR-fold of the key bytes.
pub fn channel_hash(name: &str, key: &[u8]) -> u32 {
    u32::from(xor_fold(name.as_bytes()) ^ xor_fold(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn short_default_key_expands() {
        let k = ChannelKey::parse("AQ==").unwrap();
        assert_eq!(k, ChannelKey::Aes128(DEFAULT_KEY));
        assert_eq!(ChannelKey::parse("1PG7OiApB1nwvP+rz05pAQ==").unwrap(), k);
    }

    #[test]
    fn short_key_index_bumps_last_byte() {
        let k = ChannelKey::parse("Ag==").unwrap();
        assert_eq!(k.as_bytes()[15], 0x02);
        assert_eq!(&k.as_bytes()[..15], &DEFAULT_KEY[..15]);
    }

    #[test]
    fn empty_and_zero_disable_crypto() {
        assert_eq!(ChannelKey::parse("").unwrap(), ChannelKey::None);
        assert_eq!(ChannelKey::parse("AA==").unwrap(), ChannelKey::None);
        assert!(!ChannelKey::None.is_enabled());
    }

    #[test]
    fn url_safe_and_unpadded_accepted() {
        let std = ChannelKey::parse("1PG7OiApB1nwvP+rz05pAQ==").unwrap();
        assert_eq!(ChannelKey::parse("1PG7OiApB1nwvP-rz05pAQ").unwrap(), std);
    }

    #[test]
    fn aes256_key() {
        let raw = [7u8; 32];
        let k = ChannelKey::from_bytes(&raw).unwrap();
        assert!(matches!(k, ChannelKey::Aes256(_)));
        assert_eq!(k.as_bytes(), &raw);
    }

    #[test]
    fn bad_lengths_rejected() {
        let err = ChannelKey::from_bytes(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_KEY");
        assert!(ChannelKey::parse("not base64!").is_err());
    }

    #[test]
    fn debug_redacts() {
        let k = ChannelKey::Aes128(DEFAULT_KEY);
        assert_eq!(format!("{k:?}"), "ChannelKey::Aes128(..)");
    }

    #[test]
    fn well_known_channel_numbers() {
        assert_eq!(channel_hash("LongFast", &DEFAULT_KEY), 8);
        assert_eq!(channel_hash("MediumFast", &DEFAULT_KEY), 31);
        assert_eq!(channel_hash("ShortFast", &DEFAULT_KEY), 112);
    }

    #[test]
    fn hash_is_deterministic_and_sensitive() {
        let a = channel_hash("LongFast", &DEFAULT_KEY);
        assert_eq!(a, channel_hash("LongFast", &DEFAULT_KEY));
        assert_ne!(a, channel_hash("LongFasu", &DEFAULT_KEY));
        let mut k = DEFAULT_KEY;
        k[3] ^= 0x10;
        assert_ne!(a, channel_hash("LongFast", &k));
    }

    #[test]
    fn hash_without_key_is_name_fold() {
        assert_eq!(channel_hash("A", &[]), 0x41);
        assert_eq!(channel_hash("", &[]), 0);
    }
}
