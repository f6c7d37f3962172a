//! Inbound token bucket, applied by the relay worker before each message.

use std::time::Duration;

use tokio::time::Instant;

/// Optional throttle; `None` bucket means unlimited.
#[derive(Debug)]
pub struct Throttle {
    bucket: Option<TokenBucket>,
}

impl Throttle {
    /// `rps == 0` disables throttling.
    pub fn new(rps: u32, burst: u32) -> Self {
        let bucket = (rps > 0).then(|| TokenBucket::new(rps, burst, Instant::now()));
        Self { bucket }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Wait until a token is available, then take it.
    pub async fn acquire(&mut self) {
        let Some(bucket) = self.bucket.as_mut() else {
            return;
        };
        loop {
            match bucket.try_take(Instant::now()) {
                None => return,
                Some(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    rps: u32,
    capacity: u32,
    tokens: u32,
    last: Instant,
}

impl TokenBucket {
    fn new(rps: u32, burst: u32, now: Instant) -> Self {
        let rps = rps.max(1);
        let capacity = burst.max(1);
        Self {
            rps,
            capacity,
            tokens: capacity,
            last: now,
        }
    }

    fn token_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.rps))
    }

    /// Take a token, or return how long to wait for the next one.
    fn try_take(&mut self, now: Instant) -> Option<Duration> {
        self.refill(now);

        if self.tokens == 0 {
            let wait = self
                .token_interval()
                .saturating_sub(now.duration_since(self.last));
            return Some(wait.max(Duration::from_millis(1)));
        }
        self.tokens -= 1;
        None
    }

    /// Credit whole tokens for elapsed time. `last` advances only by the time
    /// those tokens account for, so the fractional remainder carries over.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last).as_nanos();
        let add = elapsed * u128::from(self.rps) / 1_000_000_000;
        if add == 0 {
            return;
        }
        let tokens = u128::from(self.tokens) + add;
        if tokens >= u128::from(self.capacity) {
            self.tokens = self.capacity;
            self.last = now;
        } else {
            self.tokens = tokens as u32;
            let credited = add * 1_000_000_000 / u128::from(self.rps);
            self.last += Duration::from_nanos(credited as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_then_wait() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(10, 2, t0);
        assert!(b.try_take(t0).is_none());
        assert!(b.try_take(t0).is_none());
        assert_eq!(b.try_take(t0), Some(Duration::from_millis(100)));
        assert!(b.try_take(t0 + Duration::from_millis(100)).is_none());
    }

    #[test]
    fn fractional_time_carries_over() {
        let t0 = Instant::now();
        let mut b = TokenBucket::new(3, 2, t0);
        assert!(b.try_take(t0).is_none());
        assert!(b.try_take(t0).is_none());
        // 400 ms buys one token at 3 rps with ~67 ms left over
        assert!(b.try_take(t0 + Duration::from_millis(400)).is_none());
        // 300 ms later the remainder completes the next token
        assert!(b.try_take(t0 + Duration::from_millis(700)).is_none());
        assert!(b.try_take(t0 + Duration::from_millis(700)).is_some());
    }

    #[test]
    fn disabled_when_rps_zero() {
        assert!(!Throttle::new(0, 10).is_enabled());
        assert!(Throttle::new(5, 10).is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_sleeps_when_empty() {
        let mut t = Throttle::new(10, 1);
        let start = Instant::now();
        t.acquire().await;
        t.acquire().await;
        assert!(Instant::now().duration_since(start) >= Duration::from_millis(100));
    }
}
