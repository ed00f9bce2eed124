use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Per-identity nonce source.
///
/// Each value is `max(clock(), last + 1)`: seeded from wall-clock milliseconds
/// so a fresh process does not collide with an earlier one, and strictly
/// increasing within the process even when many calls land in the same
/// millisecond. The clock is pluggable for venues with a different seeding rule.
pub struct NonceCounter {
    last: AtomicU64,
    clock: Clock,
}

impl NonceCounter {
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Utc::now().timestamp_millis().max(0) as u64)
    }

    pub fn with_clock(clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self {
            last: AtomicU64::new(0),
            clock: Arc::new(clock),
        }
    }

    /// Allocate the next nonce. No two calls ever observe the same value.
    pub fn next(&self) -> u64 {
        let now = (self.clock)();
        let previous = match self.last.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last + 1))
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        now.max(previous + 1)
    }

    /// Last value handed out, or 0.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

impl Default for NonceCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NonceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceCounter")
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_frozen_clock_still_increments() {
        let counter = NonceCounter::with_clock(|| 1_000);
        assert_eq!(counter.next(), 1_000);
        assert_eq!(counter.next(), 1_001);
        assert_eq!(counter.next(), 1_002);
    }

    #[test]
    fn test_clock_jump_forward_is_followed() {
        let now = Arc::new(AtomicU64::new(10));
        let clock = now.clone();
        let counter = NonceCounter::with_clock(move || clock.load(Ordering::SeqCst));
        assert_eq!(counter.next(), 10);
        now.store(500, Ordering::SeqCst);
        assert_eq!(counter.next(), 500);
        now.store(20, Ordering::SeqCst);
        assert_eq!(counter.next(), 501);
    }

    #[test]
    fn test_concurrent_nonces_are_distinct() {
        let counter = Arc::new(NonceCounter::with_clock(|| 42));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || (0..250).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            let values = handle.join().unwrap();
            assert!(values.windows(2).all(|w| w[0] < w[1]));
            all.extend(values);
        }
        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), 2_000);
        assert_eq!(*all.iter().max().unwrap(), 42 + 1_999);
    }

    #[test]
    fn test_default_clock_is_wall_time() {
        let counter = NonceCounter::new();
        let before = chrono::Utc::now().timestamp_millis() as u64;
        let nonce = counter.next();
        assert!(nonce >= before);
    }
}
