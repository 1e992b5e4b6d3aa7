//! Browser bindings
//!
//! `WebLesson` is the handle a JS host mounts. Every exported method takes
//! `&self`, so wasm-bindgen only ever holds a shared borrow of the handle.
//! Host callbacks are queued in a [`HostOutbox`] while the runtime is borrowed
//! and delivered afterwards, so a callback can query the lesson again (or
//! drive it) from inside `onEvent`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{Clock, HostOutbox, Ticker};
use crate::lessons;
use crate::runtime::{LessonRuntime, Phase};
use crate::settings::RuntimeConfig;

/// Route panics and `log` output to the browser console. Safe to call again.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// `performance.now()` clock
#[derive(Debug, Clone, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// One-shot `setTimeout`, cleared on drop
struct Timeout {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Timeout {
    fn schedule(delay_ms: f64, f: impl FnMut() + 'static) -> Option<Self> {
        let closure = Closure::<dyn FnMut()>::new(f);
        let id = web_sys::window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms as i32,
            )
            .ok()?;
        Some(Self {
            id,
            _closure: closure,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.id);
        }
    }
}

/// `setInterval` ticker, cleared on cancel or drop
#[derive(Default)]
pub struct IntervalTicker {
    handle: Option<(i32, Closure<dyn FnMut()>)>,
}

impl Ticker for IntervalTicker {
    fn start(&mut self, period_ms: f64, mut on_tick: Box<dyn FnMut(f64)>) {
        self.cancel();
        let dt = period_ms / 1000.0;
        let closure = Closure::<dyn FnMut()>::new(move || on_tick(dt));
        let Some(window) = web_sys::window() else {
            return;
        };
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms as i32,
        ) {
            Ok(id) => self.handle = Some((id, closure)),
            Err(_) => log::warn!("setInterval failed; animation disabled"),
        }
    }

    fn cancel(&mut self) {
        if let Some((id, _closure)) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(id);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A mounted lesson, driven from JS
#[wasm_bindgen]
pub struct WebLesson {
    runtime: Rc<RefCell<LessonRuntime>>,
    clock: PerformanceClock,
    ticker: RefCell<IntervalTicker>,
    release_timer: RefCell<Option<Timeout>>,
    outbox: HostOutbox,
    on_event: Option<js_sys::Function>,
    on_phase_complete: Option<js_sys::Function>,
    on_lesson_complete: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl WebLesson {
    /// Mount a catalog lesson.
    ///
    /// `game_phase` embeds the lesson in a host-driven stepper; unknown values
    /// start at the hook. `config_json` overrides [`RuntimeConfig`] fields.
    #[wasm_bindgen(constructor)]
    pub fn new(
        lesson_id: &str,
        config_json: Option<String>,
        game_phase: Option<String>,
        on_event: Option<js_sys::Function>,
        on_phase_complete: Option<js_sys::Function>,
        on_lesson_complete: Option<js_sys::Function>,
    ) -> Result<WebLesson, JsValue> {
        init_logging();
        let content = lessons::find(lesson_id)
            .ok_or_else(|| JsValue::from_str(&format!("unknown lesson {lesson_id:?}")))?;
        let config = config_json
            .as_deref()
            .map(RuntimeConfig::from_json)
            .unwrap_or_default();
        let tick_ms = config.tick_ms;

        let outbox = HostOutbox::new();
        let builder = LessonRuntime::builder(content)
            .config(config)
            .initial_phase(game_phase.as_deref());
        let runtime = outbox
            .attach(builder)
            .build()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let runtime = Rc::new(RefCell::new(runtime));

        let mut ticker = IntervalTicker::default();
        let weak = Rc::downgrade(&runtime);
        ticker.start(
            tick_ms,
            Box::new(move |dt| {
                if let Some(rt) = weak.upgrade() {
                    rt.borrow_mut().tick(dt);
                }
            }),
        );

        Ok(WebLesson {
            runtime,
            clock: PerformanceClock,
            ticker: RefCell::new(ticker),
            release_timer: RefCell::new(None),
            outbox,
            on_event,
            on_phase_complete,
            on_lesson_complete,
        })
    }

    pub fn phase(&self) -> String {
        self.runtime.borrow().phase().as_str().to_string()
    }

    pub fn phase_label(&self) -> String {
        self.runtime.borrow().phase().label().to_string()
    }

    pub fn progress(&self) -> f32 {
        self.runtime.borrow().phase().progress()
    }

    pub fn can_advance(&self) -> bool {
        self.runtime.borrow().can_advance()
    }

    pub fn anim_time(&self) -> f64 {
        self.runtime.borrow().state().anim_time
    }

    /// Static lesson content as JSON
    pub fn descriptor_json(&self) -> String {
        serde_json::to_string(self.runtime.borrow().descriptor()).unwrap_or_default()
    }

    /// Learner state as JSON
    pub fn state_json(&self) -> String {
        serde_json::to_string(self.runtime.borrow().state()).unwrap_or_default()
    }

    pub fn next(&self) -> bool {
        let now = self.clock.now_ms();
        let moved = self.runtime.borrow_mut().next(now);
        self.after_transition(moved)
    }

    pub fn prev(&self) -> bool {
        let now = self.clock.now_ms();
        let moved = self.runtime.borrow_mut().prev(now);
        self.after_transition(moved)
    }

    pub fn go_to(&self, phase: &str) -> bool {
        let Some(target) = Phase::parse(phase) else {
            return false;
        };
        let now = self.clock.now_ms();
        let moved = self.runtime.borrow_mut().go_to(target, now);
        self.after_transition(moved)
    }

    /// Host-controlled phase prop changed
    pub fn sync_phase(&self, game_phase: Option<String>) -> bool {
        let now = self.clock.now_ms();
        let moved = self
            .runtime
            .borrow_mut()
            .sync_external(game_phase.as_deref(), now);
        self.flush();
        moved
    }

    pub fn select_prediction(&self, tag: &str) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().select_prediction(tag, now);
        self.flush();
        ok
    }

    pub fn select_twist_prediction(&self, tag: &str) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().select_twist_prediction(tag, now);
        self.flush();
        ok
    }

    pub fn set_param(&self, key: &str, value: f64) -> Option<f64> {
        let now = self.clock.now_ms();
        let stored = self.runtime.borrow_mut().set_param(key, value, now);
        self.flush();
        stored
    }

    pub fn record_milestone(&self, name: &str) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().record_milestone(name, now);
        self.flush();
        ok
    }

    pub fn open_application(&self, index: usize) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().open_application(index, now);
        self.flush();
        ok
    }

    pub fn select_application(&self, index: usize) -> bool {
        self.runtime.borrow_mut().select_application(index)
    }

    pub fn active_application(&self) -> usize {
        self.runtime.borrow().transfer().active()
    }

    pub fn select_answer(&self, question: usize, tag: &str) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().select_answer(question, tag, now);
        self.flush();
        ok
    }

    pub fn next_question(&self) -> bool {
        self.runtime.borrow_mut().next_question()
    }

    pub fn prev_question(&self) -> bool {
        self.runtime.borrow_mut().prev_question()
    }

    pub fn go_to_question(&self, index: usize) {
        self.runtime.borrow_mut().go_to_question(index);
    }

    pub fn question_cursor(&self) -> usize {
        self.runtime.borrow().quiz().cursor()
    }

    pub fn can_submit(&self) -> bool {
        self.runtime.borrow().quiz().can_submit()
    }

    /// `{score, total, passed}` as JSON, or `undefined` while answers are missing
    pub fn submit_quiz(&self) -> Option<String> {
        let now = self.clock.now_ms();
        let result = self.runtime.borrow_mut().submit_quiz(now);
        self.flush();
        result.and_then(|r| serde_json::to_string(&r).ok())
    }

    /// Per-question feedback as JSON, after submission
    pub fn quiz_review_json(&self) -> Option<String> {
        let review = self.runtime.borrow().quiz_review()?;
        serde_json::to_string(&review).ok()
    }

    pub fn retry_quiz(&self) -> bool {
        let now = self.clock.now_ms();
        let ok = self.runtime.borrow_mut().retry_quiz(now);
        self.flush();
        ok
    }

    /// Stop timers; call when the host unmounts the lesson
    pub fn dispose(&self) {
        self.ticker.borrow_mut().cancel();
        drop(self.release_timer.take());
    }
}

impl WebLesson {
    /// Schedule the lock release and deliver callbacks
    fn after_transition(&self, moved: bool) -> bool {
        if moved {
            let weak: Weak<RefCell<LessonRuntime>> = Rc::downgrade(&self.runtime);
            let delay = self.runtime.borrow().lock_release_ms();
            let timer = Timeout::schedule(delay, move || {
                if let Some(rt) = weak.upgrade() {
                    rt.borrow_mut().release_lock();
                }
            });
            // Dropping the previous timer clears it
            let previous = self.release_timer.replace(timer);
            drop(previous);
        }
        self.flush();
        moved
    }

    /// Deliver queued events and callbacks to JS. Nothing is borrowed while
    /// the host runs; errors it throws are logged and otherwise ignored.
    fn flush(&self) {
        self.outbox.deliver(
            |event| {
                let Some(f) = &self.on_event else { return };
                let value = event
                    .to_json()
                    .ok()
                    .and_then(|json| js_sys::JSON::parse(&json).ok());
                if let Some(value) = value {
                    if let Err(e) = f.call1(&JsValue::NULL, &value) {
                        log::warn!("onEvent threw for {}: {:?}", event.type_name(), e);
                    }
                }
            },
            |phase| {
                let Some(f) = &self.on_phase_complete else { return };
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(phase.as_str())) {
                    log::warn!("onPhaseComplete threw for {}: {:?}", phase, e);
                }
            },
            |result| {
                let Some(f) = &self.on_lesson_complete else { return };
                let value = serde_json::to_string(&result)
                    .ok()
                    .and_then(|json| js_sys::JSON::parse(&json).ok())
                    .unwrap_or(JsValue::UNDEFINED);
                if let Err(e) = f.call1(&JsValue::NULL, &value) {
                    log::warn!("onLessonComplete threw: {:?}", e);
                }
            },
        );
    }
}

/// Ids of every lesson in the catalog
#[wasm_bindgen]
pub fn lesson_ids() -> Vec<String> {
    lessons::catalog()
        .iter()
        .map(|l| l.descriptor().id.to_string())
        .collect()
}
