//! Single-slot debouncer for patch regeneration.
//!
//! Continuous input (sliders, drags, wheel) updates a decal's transform on
//! every event but only rebuilds its geometry once the input settles. There
//! is one pending slot: rescheduling the same key pushes the deadline back,
//! while scheduling a different key hands the displaced key back to the
//! caller so its update is applied immediately rather than lost.

use std::time::{Duration, Instant};

/// Coalesces bursts of requests for the same key
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    pending: Option<(K, Instant)>,
}

impl<K: Clone + PartialEq> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `key` to fire `delay` after `now`.
    ///
    /// Returns the previously pending key when it differs from `key`; the
    /// caller must apply it right away.
    pub fn schedule(&mut self, key: K, now: Instant) -> Option<K> {
        let displaced = match self.pending.take() {
            Some((previous, _)) if previous != key => Some(previous),
            _ => None,
        };
        self.pending = Some((key, now + self.delay));
        displaced
    }

    /// Release the pending key once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<K> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(key, _)| key),
            _ => None,
        }
    }

    /// Release the pending key regardless of its deadline
    pub fn flush(&mut self) -> Option<K> {
        self.pending.take().map(|(key, _)| key)
    }

    /// Drop the pending key if it matches
    pub fn cancel_key(&mut self, key: &K) -> bool {
        if self.pending_key() == Some(key) {
            self.pending = None;
            return true;
        }
        false
    }

    /// Drop whatever is pending
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending_key(&self) -> Option<&K> {
        self.pending.as_ref().map(|(key, _)| key)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(16);

    #[test]
    fn test_fires_after_delay() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.schedule("a", t0), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(10)), None);
        assert_eq!(debouncer.poll(t0 + DELAY), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_same_key_coalesces_and_resets_timer() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        for ms in [0, 5, 10, 15] {
            assert_eq!(debouncer.schedule("a", t0 + Duration::from_millis(ms)), None);
        }
        // Deadline is now 15 + 16 = 31ms
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(20)), None);
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(31)), Some("a"));
        assert_eq!(debouncer.poll(t0 + Duration::from_millis(100)), None);
    }

    #[test]
    fn test_different_key_displaces() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("a", t0);
        assert_eq!(debouncer.schedule("b", t0), Some("a"));
        assert_eq!(debouncer.pending_key(), Some(&"b"));
    }

    #[test]
    fn test_flush_and_cancel() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("a", t0);
        assert_eq!(debouncer.flush(), Some("a"));
        assert_eq!(debouncer.flush(), None);

        debouncer.schedule("a", t0);
        assert!(!debouncer.cancel_key(&"b"));
        assert!(debouncer.cancel_key(&"a"));
        assert!(!debouncer.is_pending());

        debouncer.schedule("c", t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(t0 + DELAY), None);
    }
}
