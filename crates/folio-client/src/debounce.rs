//! Keyed trailing-edge debouncer.
//!
//! Each key holds the latest value and a deadline. Pushing again replaces
//! the value and pushes the deadline out by the full window. Time is passed
//! in explicitly; the owner decides when to poll (the editor actor sleeps
//! until [`Debouncer::next_deadline`]).
//!
//! ```text
//!   push(a) ──┐ push(a') ──┐            deadline
//!             ▼            ▼               │
//!   ──────────●────────────●───────────────▼──► take_due → [(key, a')]
//!                          └──── window ───┘
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer<K, V> {
    window: Duration,
    pending: BTreeMap<K, (V, Instant)>,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: BTreeMap::new() }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Store `value` under `key`, replacing any pending value and restarting
    /// its timer from `now`.
    pub fn push(&mut self, key: K, value: V, now: Instant) {
        self.pending.insert(key, (value, now + self.window));
    }

    /// Earliest deadline among pending keys.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }

    /// Remove and return every entry whose deadline is at or before `now`,
    /// in key order.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        due.into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|(value, _)| (key, value)))
            .collect()
    }

    /// Remove one entry regardless of its deadline.
    pub fn take(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|(value, _)| value)
    }

    /// Remove every entry regardless of deadlines.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, (value, _))| (key, value))
            .collect()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.pending.get(key).map(|(value, _)| value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_push_resets_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a", 1, start);
        debouncer.push("a", 2, start + Duration::from_millis(200));

        assert!(debouncer.take_due(start + Duration::from_millis(300)).is_empty());
        assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(500)));
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)), vec![("a", 2)]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a", 1, start);
        debouncer.push("b", 2, start + Duration::from_millis(100));

        assert_eq!(debouncer.take_due(start + WINDOW), vec![("a", 1)]);
        assert!(debouncer.contains(&"b"));
        assert_eq!(debouncer.next_deadline(), Some(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_take_and_drain_ignore_deadlines() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a", 1, start);
        debouncer.push("b", 2, start);
        debouncer.push("c", 3, start);

        assert_eq!(debouncer.take(&"b"), Some(2));
        assert_eq!(debouncer.take(&"b"), None);
        assert_eq!(debouncer.drain(), vec![("a", 1), ("c", 3)]);
        assert_eq!(debouncer.next_deadline(), None);
    }
}
