//! Relay policy (portnum allowlist, inbound throttling).
//!
//! Compiles config into fast lookup structures consumed by the relay and
//! transport layers at runtime.

pub mod portfilter;
pub mod throttle;

pub use portfilter::PortFilter;
pub use throttle::Throttle;
