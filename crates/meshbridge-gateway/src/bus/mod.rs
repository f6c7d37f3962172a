//! Bus seam between the relay and whatever carries its traffic.

pub mod publisher;

pub use publisher::Publisher;
