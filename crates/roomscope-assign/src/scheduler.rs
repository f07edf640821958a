//! Keyed debounce scheduling.
//!
//! Time is passed in explicitly, so callers drive the scheduler from their
//! event loop and tests drive it with synthetic instants.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// One pending deadline per key; rescheduling a key replaces its deadline.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    /// Creates a scheduler with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    /// Returns the quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `key` to fire `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.delay);
    }

    /// Cancels a pending key. Returns whether it was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    /// Returns whether `key` is pending.
    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    /// Returns the deadline of `key`.
    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    /// Returns the earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every key whose deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let due: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.deadlines.remove(key);
        }
        due
    }

    /// Returns whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("sim", start);
        assert!(debouncer.take_due(start + Duration::from_millis(299)).is_empty());
        assert_eq!(debouncer.take_due(start + Duration::from_millis(300)), vec!["sim"]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_reschedule_pushes_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("sim", start);
        debouncer.schedule("sim", start + Duration::from_millis(200));
        assert!(debouncer.take_due(start + Duration::from_millis(400)).is_empty());
        assert_eq!(
            debouncer.deadline(&"sim"),
            Some(start + Duration::from_millis(500))
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)).len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("a", start);
        debouncer.schedule("b", start + Duration::from_millis(50));
        assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(100)));
        assert_eq!(debouncer.take_due(start + Duration::from_millis(120)), vec!["a"]);
        assert!(debouncer.is_pending(&"b"));
        assert!(debouncer.cancel(&"b"));
        assert!(!debouncer.cancel(&"b"));
    }
}
