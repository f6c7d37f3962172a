//! Top-level facade crate for meshbridge.
//!
//! Re-exports the core primitives and the gateway library so users can depend on a single crate.

pub mod core {
    pub use meshbridge_core::*;
}

pub mod gateway {
    pub use meshbridge_gateway::*;
}
