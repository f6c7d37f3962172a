//! meshbridge core: transport-agnostic relay primitives and error types.
//!
//! This crate defines the Meshtastic wire records, the channel crypto, the hop
//! rewriter and the loop-prevention cache shared by the gateway and its tests.
//! It carries no bus or runtime dependencies so it can be reused in other
//! contexts (offline decoders, test harnesses).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MeshBridgeError`/`Result` so a relay
//! never crashes on malformed or hostile bus traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod crypto;
pub mod dedup;
pub mod error;
pub mod hops;
pub mod protocol;

/// Shared result type.
pub use error::{MeshBridgeError, Result};
