//! Navigation debounce and re-entrancy lock
//!
//! Touch screens often deliver a tap twice (touch + synthetic mouse event).
//! The guard accepts the first request and rejects everything that arrives
//! while a transition is in flight or inside the debounce window.
//!
//! Time is passed in by the caller (milliseconds, any monotonic origin) so the
//! guard stays deterministic under test.

use crate::consts::{DEFAULT_DEBOUNCE_MS, DEFAULT_LOCK_RELEASE_MS};

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    /// Minimum spacing between accepted transitions
    debounce_ms: f64,
    /// How long the in-flight lock is held after an accepted transition
    lock_ms: f64,
    /// Timestamp of the last accepted transition
    last_accepted: Option<f64>,
    /// Lock deadline; the lock counts as released once `now >= locked_until`
    locked_until: Option<f64>,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, DEFAULT_LOCK_RELEASE_MS)
    }
}

impl NavigationGuard {
    pub fn new(debounce_ms: f64, lock_ms: f64) -> Self {
        Self {
            debounce_ms: debounce_ms.max(0.0),
            lock_ms: lock_ms.max(0.0),
            last_accepted: None,
            locked_until: None,
        }
    }

    pub fn lock_ms(&self) -> f64 {
        self.lock_ms
    }

    /// Whether a transition is currently in flight
    pub fn is_locked(&self, now_ms: f64) -> bool {
        self.locked_until.is_some_and(|until| now_ms < until)
    }

    /// Whether `now_ms` still falls inside the debounce window
    pub fn in_debounce(&self, now_ms: f64) -> bool {
        self.last_accepted
            .is_some_and(|last| now_ms - last < self.debounce_ms)
    }

    /// Try to start a transition. Returns `false` (and changes nothing) when
    /// the request must be dropped.
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        if self.is_locked(now_ms) || self.in_debounce(now_ms) {
            return false;
        }
        self.last_accepted = Some(now_ms);
        self.locked_until = Some(now_ms + self.lock_ms);
        true
    }

    /// Release the in-flight lock early (scheduled release callback).
    /// The debounce window is left untouched.
    pub fn release(&mut self) {
        self.locked_until = None;
    }

    /// Forget all history, e.g. after the host forces a phase
    pub fn reset(&mut self) {
        self.last_accepted = None;
        self.locked_until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_accepted() {
        let mut guard = NavigationGuard::new(300.0, 400.0);
        assert!(guard.try_acquire(0.0));
        assert!(guard.is_locked(0.0));
    }

    #[test]
    fn test_double_tap_rejected() {
        let mut guard = NavigationGuard::new(300.0, 400.0);
        assert!(guard.try_acquire(1000.0));
        assert!(!guard.try_acquire(1010.0));
        assert!(!guard.try_acquire(1399.0));
        assert!(guard.try_acquire(1400.0));
    }

    #[test]
    fn test_release_keeps_debounce() {
        let mut guard = NavigationGuard::new(300.0, 400.0);
        assert!(guard.try_acquire(0.0));
        guard.release();
        assert!(!guard.is_locked(10.0));
        // Still inside the debounce window
        assert!(!guard.try_acquire(100.0));
        assert!(guard.try_acquire(300.0));
    }

    #[test]
    fn test_expired_lock_counts_as_released() {
        let mut guard = NavigationGuard::new(0.0, 400.0);
        assert!(guard.try_acquire(0.0));
        assert!(guard.is_locked(399.0));
        assert!(!guard.is_locked(400.0));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut guard = NavigationGuard::new(300.0, 400.0);
        assert!(guard.try_acquire(0.0));
        guard.reset();
        assert!(guard.try_acquire(1.0));
    }

    #[test]
    fn test_negative_windows_clamped() {
        let mut guard = NavigationGuard::new(-5.0, -5.0);
        assert!(guard.try_acquire(0.0));
        assert!(guard.try_acquire(0.0));
    }
}
