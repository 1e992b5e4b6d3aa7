//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`Clock`)
//! - The cosmetic animation tick (`Ticker`)
//! - Delivering host callbacks outside the runtime borrow (`HostOutbox`)
//! - The JS-facing lesson handle (wasm only)

use std::cell::{Cell, RefCell};
use std::rc::Rc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::runtime::{EventLog, GameEvent, LessonBuilder, Phase, QuizResult};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Source of millisecond timestamps for the navigation guard and events
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Periodic, cancelable tick used only for decorative animation
pub trait Ticker {
    /// Start ticking every `period_ms`; the callback receives elapsed seconds
    /// since the previous tick. Restarting replaces the previous callback.
    fn start(&mut self, period_ms: f64, on_tick: Box<dyn FnMut(f64)>);
    fn cancel(&mut self);
    fn is_running(&self) -> bool;
}

/// Wall clock measured from construction
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for scripted walkthroughs and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Ticker driven by explicit `advance` calls
#[derive(Default)]
pub struct ManualTicker {
    period_ms: f64,
    pending_ms: f64,
    on_tick: Option<Box<dyn FnMut(f64)>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `elapsed_ms` pass, firing one callback per whole period
    pub fn advance(&mut self, elapsed_ms: f64) -> usize {
        let Some(on_tick) = self.on_tick.as_mut() else {
            return 0;
        };
        if self.period_ms <= 0.0 {
            return 0;
        }
        self.pending_ms += elapsed_ms.max(0.0);
        let mut fired = 0;
        while self.pending_ms >= self.period_ms {
            self.pending_ms -= self.period_ms;
            on_tick(self.period_ms / 1000.0);
            fired += 1;
        }
        fired
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, period_ms: f64, on_tick: Box<dyn FnMut(f64)>) {
        self.period_ms = period_ms;
        self.pending_ms = 0.0;
        self.on_tick = Some(on_tick);
    }

    fn cancel(&mut self) {
        self.on_tick = None;
        self.pending_ms = 0.0;
    }

    fn is_running(&self) -> bool {
        self.on_tick.is_some()
    }
}

/// Host callbacks recorded while a runtime call is in progress
#[derive(Debug, Default)]
struct Pending {
    completed_phases: Vec<Phase>,
    lesson_complete: Option<QuizResult>,
}

/// Queue between a [`LessonRuntime`](crate::runtime::LessonRuntime) and its
/// host.
///
/// The runtime only ever writes into the outbox; the host drains it with
/// [`deliver`](Self::deliver) once the runtime borrow has been released, so
/// host callbacks can query the lesson (or drive it again) without tripping
/// a `RefCell` borrow.
#[derive(Debug, Clone, Default)]
pub struct HostOutbox {
    events: EventLog,
    pending: Rc<RefCell<Pending>>,
}

impl HostOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route the builder's event sink and completion callbacks into the outbox
    pub fn attach(&self, builder: LessonBuilder) -> LessonBuilder {
        let phases = self.pending.clone();
        let complete = self.pending.clone();
        builder
            .sink(self.events.clone())
            .on_phase_complete(move |p| phases.borrow_mut().completed_phases.push(p))
            .on_lesson_complete(move |r| complete.borrow_mut().lesson_complete = Some(r))
    }

    pub fn is_empty(&self) -> bool {
        let pending = self.pending.borrow();
        self.events.is_empty()
            && pending.completed_phases.is_empty()
            && pending.lesson_complete.is_none()
    }

    /// Hand everything queued so far to the host: events first, then
    /// phase-complete, then lesson-complete. The queue is emptied before any
    /// callback runs; anything a callback causes is left for the next call.
    pub fn deliver(
        &self,
        mut on_event: impl FnMut(GameEvent),
        mut on_phase_complete: impl FnMut(Phase),
        mut on_lesson_complete: impl FnMut(QuizResult),
    ) {
        let events = self.events.drain();
        let Pending {
            completed_phases,
            lesson_complete,
        } = std::mem::take(&mut *self.pending.borrow_mut());

        for event in events {
            on_event(event);
        }
        for phase in completed_phases {
            on_phase_complete(phase);
        }
        if let Some(result) = lesson_complete {
            on_lesson_complete(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lessons::SpeedOfSound;
    use crate::runtime::{EventKind, LessonRuntime};

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100.0);
        clock.advance(250.0);
        assert_eq!(clock.now_ms(), 350.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::default();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_ticker_fires_per_period() {
        let total = Rc::new(Cell::new(0.0));
        let sink = total.clone();
        let mut ticker = ManualTicker::new();
        assert_eq!(ticker.advance(100.0), 0);

        ticker.start(50.0, Box::new(move |dt| sink.set(sink.get() + dt)));
        assert!(ticker.is_running());
        assert_eq!(ticker.advance(120.0), 2);
        assert_eq!(ticker.advance(30.0), 1);
        assert!((total.get() - 0.15).abs() < 1e-12);

        ticker.cancel();
        assert!(!ticker.is_running());
        assert_eq!(ticker.advance(500.0), 0);
    }

    #[test]
    fn test_outbox_callbacks_see_post_change_state() {
        let outbox = HostOutbox::new();
        let rt = RefCell::new(
            outbox
                .attach(LessonRuntime::builder(SpeedOfSound))
                .build()
                .unwrap(),
        );
        assert!(rt.borrow_mut().next(0.0));
        assert!(!outbox.is_empty());

        let seen = RefCell::new(Vec::new());
        outbox.deliver(
            |e| seen.borrow_mut().push((e.type_name(), rt.borrow().phase())),
            |p| seen.borrow_mut().push(("phase_complete", p)),
            |_| panic!("lesson is not complete"),
        );
        assert_eq!(
            *seen.borrow(),
            vec![("phase_changed", Phase::Predict), ("phase_complete", Phase::Hook)]
        );
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_outbox_callback_can_drive_runtime() {
        let outbox = HostOutbox::new();
        let rt = RefCell::new(
            outbox
                .attach(LessonRuntime::builder(SpeedOfSound).initial_phase(Some("review")))
                .build()
                .unwrap(),
        );
        assert!(rt.borrow_mut().prev(0.0));

        // A host reacting to the event by jumping ahead
        outbox.deliver(
            |_| assert!(rt.borrow_mut().go_to(Phase::Transfer, 1000.0)),
            |_| {},
            |_| {},
        );
        assert_eq!(rt.borrow().phase(), Phase::Transfer);

        let mut later = Vec::new();
        outbox.deliver(|e| later.push(e.kind), |_| {}, |_| {});
        assert_eq!(
            later,
            vec![EventKind::PhaseChanged { from: Phase::Play, to: Phase::Transfer }]
        );
    }
}
