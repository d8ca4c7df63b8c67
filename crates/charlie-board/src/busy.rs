//! Single-flight flag for form submissions.

use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a submission is waiting on its round trip
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Claim the flag, or `None` if a submission is already in flight
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the flag on drop
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let flag = BusyFlag::default();

        let guard = flag.try_acquire();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_acquire().is_some());
    }
}
