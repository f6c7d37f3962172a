//! Channel crypto: key material, channel hashes and the AES-CTR payload codec.

pub mod channel;
pub mod codec;

pub use channel::{channel_hash, ChannelKey};
pub use codec::{decrypt, encrypt};
