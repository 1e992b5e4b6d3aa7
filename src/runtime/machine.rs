//! Phase state machine
//!
//! Holds the current phase and applies guarded transitions. Side effects
//! (events, host callbacks, phase-entry resets) belong to the caller, which
//! acts on the returned [`Transition`].

use serde::{Deserialize, Serialize};

use super::guard::NavigationGuard;
use super::phase::Phase;

/// An accepted phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseStateMachine {
    current: Phase,
    guard: NavigationGuard,
}

impl PhaseStateMachine {
    pub fn new(guard: NavigationGuard) -> Self {
        Self {
            current: Phase::INITIAL,
            guard,
        }
    }

    /// Start at a host-supplied phase name; unknown names fall back to the hook
    pub fn with_initial(guard: NavigationGuard, initial: Option<&str>) -> Self {
        let mut machine = Self::new(guard);
        if let Some(phase) = initial.and_then(Phase::parse) {
            machine.current = phase;
        } else if let Some(name) = initial {
            log::warn!("Unknown initial phase {:?}, starting at {}", name, Phase::INITIAL);
        }
        machine
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Whether a transition is still in flight at `now_ms`
    pub fn is_transitioning(&self, now_ms: f64) -> bool {
        self.guard.is_locked(now_ms)
    }

    /// Jump to `target`. Returns `None` when the guard drops the request or
    /// the target is already current.
    pub fn go_to(&mut self, target: Phase, now_ms: f64) -> Option<Transition> {
        if target == self.current {
            return None;
        }
        if !self.guard.try_acquire(now_ms) {
            log::debug!("Transition {} -> {} suppressed", self.current, target);
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: target,
        };
        self.current = target;
        Some(transition)
    }

    /// Advance one phase; no-op at mastery
    pub fn next(&mut self, now_ms: f64) -> Option<Transition> {
        let target = self.current.next()?;
        self.go_to(target, now_ms)
    }

    /// Step back one phase; no-op at the hook
    pub fn prev(&mut self, now_ms: f64) -> Option<Transition> {
        let target = self.current.prev()?;
        self.go_to(target, now_ms)
    }

    /// Scheduled release of the in-flight lock
    pub fn release_lock(&mut self) {
        self.guard.release();
    }

    /// Adopt a host-controlled phase. The host wins on conflict; the guard is
    /// bypassed and reset. Absent or unrecognised values leave state alone.
    pub fn sync_external(&mut self, external: Option<&str>) -> Option<Transition> {
        let name = external?;
        let Some(target) = Phase::parse(name) else {
            log::warn!("Ignoring unknown host phase {:?}", name);
            return None;
        };
        if target == self.current {
            return None;
        }
        let transition = Transition {
            from: self.current,
            to: target,
        };
        self.current = target;
        self.guard.reset();
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> PhaseStateMachine {
        PhaseStateMachine::new(NavigationGuard::new(300.0, 400.0))
    }

    #[test]
    fn test_next_walks_sequence() {
        let mut m = machine();
        let mut now = 0.0;
        for expected in Phase::ALL.iter().skip(1) {
            let t = m.next(now).expect("transition accepted");
            assert_eq!(t.to, *expected);
            now += 500.0;
        }
        assert_eq!(m.current(), Phase::Mastery);
        assert_eq!(m.next(now), None);
    }

    #[test]
    fn test_prev_at_hook_is_noop() {
        let mut m = machine();
        assert_eq!(m.prev(0.0), None);
        assert_eq!(m.current(), Phase::Hook);
    }

    #[test]
    fn test_debounced_double_go_to() {
        let mut m = machine();
        assert!(m.go_to(Phase::Play, 0.0).is_some());
        assert!(m.go_to(Phase::Review, 50.0).is_none());
        assert_eq!(m.current(), Phase::Play);
    }

    #[test]
    fn test_go_to_current_is_noop() {
        let mut m = machine();
        assert_eq!(m.go_to(Phase::Hook, 0.0), None);
        // Rejected no-op doesn't consume the debounce window
        assert!(m.go_to(Phase::Predict, 1.0).is_some());
    }

    #[test]
    fn test_with_initial_falls_back() {
        let m = PhaseStateMachine::with_initial(NavigationGuard::default(), Some("bogus"));
        assert_eq!(m.current(), Phase::Hook);
        let m = PhaseStateMachine::with_initial(NavigationGuard::default(), Some("transfer"));
        assert_eq!(m.current(), Phase::Transfer);
    }

    #[test]
    fn test_sync_external_host_wins() {
        let mut m = machine();
        assert!(m.go_to(Phase::Predict, 0.0).is_some());
        // Inside the lock window, yet the host still wins
        let t = m.sync_external(Some("test")).expect("host phase adopted");
        assert_eq!(t, Transition { from: Phase::Predict, to: Phase::Test });
        assert_eq!(m.current(), Phase::Test);
        assert!(!m.is_transitioning(1.0));
        assert_eq!(m.sync_external(Some("nonsense")), None);
        assert_eq!(m.sync_external(None), None);
        assert_eq!(m.current(), Phase::Test);
    }
}
