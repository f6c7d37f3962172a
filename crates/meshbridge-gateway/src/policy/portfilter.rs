//! Forwarded-portnum allowlist.

use std::collections::HashSet;

use meshbridge_core::protocol::PortNum;

/// Compiled set of application ports eligible for relay.
#[derive(Debug, Clone)]
pub struct PortFilter {
    allowed: HashSet<i32>,
}

impl PortFilter {
    pub fn new(raw: &[i32]) -> Self {
        Self {
            allowed: raw.iter().copied().collect(),
        }
    }

    pub fn is_forwarded(&self, portnum: i32) -> bool {
        self.allowed.contains(&portnum)
    }

    /// Allowed portnum names, sorted by value, for the startup log line.
    pub fn describe(&self) -> Vec<String> {
        let mut v: Vec<i32> = self.allowed.iter().copied().collect();
        v.sort_unstable();
        v.into_iter().map(PortNum::name_of).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership() {
        let f = PortFilter::new(&[1, 3, 70]);
        assert!(f.is_forwarded(1));
        assert!(f.is_forwarded(70));
        assert!(!f.is_forwarded(67));
    }

    #[test]
    fn describe_sorted_names() {
        let f = PortFilter::new(&[70, 1]);
        assert_eq!(f.describe(), vec!["TEXT_MESSAGE_APP", "TRACEROUTE_APP"]);
    }
}
