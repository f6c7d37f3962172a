//! Hop-count rewrite applied when a packet crosses the bridge.
//!
//! The quantity "hops already traveled" (`hop_start - hop_limit`) is kept
//! stable so downstream hop displays stay consistent after the bridge adds
//! its own hop cost.

/// Both hop fields are 3 bits on the air.
pub const MAX_HOPS: u32 = 7;

/// Hop fields of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopFields {
    pub hop_limit: u32,
    pub hop_start: u32,
}

impl HopFields {
    pub fn new(hop_limit: u32, hop_start: u32) -> Self {
        Self {
            hop_limit,
            hop_start,
        }
    }

    /// Add `modifier` hops of budget, preserving hops traveled when the
    /// initial budget is known (`hop_start > 0`).
    pub fn rewrite(self, modifier: u32) -> Self {
        let limit = self.hop_limit.min(MAX_HOPS);
        let start = self.hop_start.min(MAX_HOPS);
        let m = modifier.min(MAX_HOPS);

        if start == 0 {
            return Self {
                hop_limit: (limit + m).min(MAX_HOPS),
                hop_start: 0,
            };
        }

        // negative when a malformed packet has hop_limit > hop_start
        let traveled = start as i64 - limit as i64;
        let ceiling = (MAX_HOPS as i64 - traveled).clamp(0, MAX_HOPS as i64);
        let hop_limit = ((limit + m) as i64).min(ceiling) as u32;

        Self {
            hop_limit,
            hop_start: (start + m).min(MAX_HOPS),
        }
    }
}
