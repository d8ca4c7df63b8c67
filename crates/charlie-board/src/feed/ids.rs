//! Post id allocation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Millisecond-timestamp ids that never repeat or go backwards.
///
/// `next(now)` returns `max(now, last + 1)`, so two posts in the same
/// millisecond (or after a clock step back) still get distinct, increasing ids.
#[derive(Debug, Default)]
pub struct IdSource {
    last: AtomicU64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids are greater than `id`
    pub fn observe(&self, id: u64) {
        self.last.fetch_max(id, Ordering::AcqRel);
    }

    pub fn next(&self, now_ms: u64) -> u64 {
        let step = |last: u64| now_ms.max(last.saturating_add(1));
        // fetch_update hands back the value it replaced; the closure never
        // returns None so this is always Ok
        match self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(step(last)))
        {
            Ok(previous) | Err(previous) => step(previous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_clock() {
        let ids = IdSource::new();
        assert_eq!(ids.next(1_000), 1_000);
        assert_eq!(ids.next(1_005), 1_005);
    }

    #[test]
    fn test_same_millisecond_does_not_collide() {
        let ids = IdSource::new();
        let a = ids.next(1_000);
        let b = ids.next(1_000);
        let c = ids.next(999);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_observe_seeds_counter() {
        let ids = IdSource::new();
        ids.observe(5_000);
        ids.observe(10);
        assert_eq!(ids.next(1_000), 5_001);
    }
}
