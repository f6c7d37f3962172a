//! Bounded, time-windowed record of recently relayed messages.
//!
//! The buffer keeps at most `capacity` entries in insertion order and evicts
//! the oldest on overflow. Entries older than `window` are ignored on lookup
//! but never purged, so capacity, not the window, bounds memory. The cache is
//! single-process and best effort: it does not survive restarts and does not
//! coordinate between relay instances.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default number of remembered messages.
pub const DEFAULT_CAPACITY: usize = 100;
/// Default expiry window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// Identity used for loop suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// Sender node and packet id; the pair the CTR nonce is built from.
    MessageId { from: u32, id: u32 },
    /// Decoded application bytes; also catches resends under a new id.
    Payload(Vec<u8>),
}

#[derive(Debug)]
pub struct RecentMessages {
    entries: VecDeque<(DedupKey, Instant)>,
    capacity: usize,
    window: Duration,
}

impl Default for RecentMessages {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_WINDOW)
    }
}

impl RecentMessages {
    pub fn new(capacity: usize, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            window,
        }
    }

    /// True if `key` was recorded within the window ending at `now`.
    pub fn seen(&self, key: &DedupKey, now: Instant) -> bool {
        self.entries
            .iter()
            .any(|(k, at)| k == key && now.saturating_duration_since(*at) < self.window)
    }

    /// Append `key`, evicting the oldest entry when full.
    pub fn record(&mut self, key: DedupKey, now: Instant) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((key, now));
    }

    /// Seen-check and record as one step. Returns `true` for a duplicate,
    /// which is not recorded again.
    pub fn check_and_record(&mut self, key: DedupKey, now: Instant) -> bool {
        if self.seen(&key, now) {
            return true;
        }
        self.record(key, now);
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn key(id: u32) -> DedupKey {
        DedupKey::MessageId { from: 0xa1b2_c3d4, id }
    }

    #[test]
    fn duplicate_within_window() {
        let mut c = RecentMessages::default();
        let t0 = Instant::now();
        assert!(!c.check_and_record(key(1), t0));
        assert!(c.check_and_record(key(1), t0 + Duration::from_secs(2)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn eligible_again_after_window() {
        let mut c = RecentMessages::default();
        let t0 = Instant::now();
        assert!(!c.check_and_record(key(1), t0));
        assert!(!c.check_and_record(key(1), t0 + Duration::from_secs(5)));
        // the fresh entry now suppresses
        assert!(c.check_and_record(key(1), t0 + Duration::from_secs(6)));
    }

    #[test]
    fn same_id_other_sender_is_distinct() {
        let mut c = RecentMessages::default();
        let t0 = Instant::now();
        c.record(DedupKey::MessageId { from: 1, id: 7 }, t0);
        assert!(!c.seen(&DedupKey::MessageId { from: 2, id: 7 }, t0));
    }

    #[test]
    fn payload_identity() {
        let mut c = RecentMessages::default();
        let t0 = Instant::now();
        c.record(DedupKey::Payload(b"hello".to_vec()), t0);
        assert!(c.seen(&DedupKey::Payload(b"hello".to_vec()), t0));
        assert!(!c.seen(&key(1), t0));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut c = RecentMessages::new(3, DEFAULT_WINDOW);
        let t0 = Instant::now();
        for id in 0..4 {
            c.record(key(id), t0);
        }
        assert_eq!(c.len(), 3);
        assert!(!c.seen(&key(0), t0));
        assert!(c.seen(&key(3), t0));
    }

    #[test]
    fn expired_entries_are_not_purged() {
        let mut c = RecentMessages::new(10, Duration::from_millis(100));
        let t0 = Instant::now();
        c.record(key(1), t0);
        assert!(!c.seen(&key(1), t0 + Duration::from_secs(1)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let c = RecentMessages::new(0, DEFAULT_WINDOW);
        assert_eq!(c.capacity(), 1);
        assert!(c.is_empty());
    }
}
