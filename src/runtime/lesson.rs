//! Lesson runtime: one mounted lesson
//!
//! Composes the phase machine, learner state, quiz and transfer tracker with
//! a content plugin and the host's callbacks. Every handler mutates state
//! first and emits its event afterwards, so a host that queries back from
//! inside its sink sees the post-change state.

use crate::audio::{self, Cue};
use crate::lessons::{ContentError, LessonContent, LessonDescriptor};
use crate::settings::RuntimeConfig;

use super::events::{EventKind, EventSink, GameEvent, NullSink};
use super::gate::{GateContext, can_advance};
use super::guard::NavigationGuard;
use super::machine::{PhaseStateMachine, Transition};
use super::phase::Phase;
use super::quiz::{QuestionReview, QuizEngine, QuizResult};
use super::state::LessonState;
use super::transfer::TransferTracker;

type PhaseCallback = Box<dyn FnMut(Phase)>;
type CompleteCallback = Box<dyn FnMut(QuizResult)>;

/// Configures and validates a [`LessonRuntime`]
pub struct LessonBuilder {
    content: Box<dyn LessonContent>,
    config: RuntimeConfig,
    initial_phase: Option<String>,
    sink: Box<dyn EventSink>,
    on_phase_complete: Option<PhaseCallback>,
    on_lesson_complete: Option<CompleteCallback>,
}

impl LessonBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Host-supplied starting phase; unknown names fall back to the hook
    pub fn initial_phase(mut self, phase: Option<&str>) -> Self {
        self.initial_phase = phase.map(str::to_string);
        self
    }

    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Called with the phase just left on every accepted transition
    pub fn on_phase_complete(mut self, f: impl FnMut(Phase) + 'static) -> Self {
        self.on_phase_complete = Some(Box::new(f));
        self
    }

    /// Called once, when mastery is first reached with a passing quiz
    pub fn on_lesson_complete(mut self, f: impl FnMut(QuizResult) + 'static) -> Self {
        self.on_lesson_complete = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<LessonRuntime, ContentError> {
        let descriptor = self.content.descriptor();
        descriptor.validate()?;

        let config = self.config.validated();
        let guard = NavigationGuard::new(config.debounce_ms, config.lock_release_ms);
        let machine = PhaseStateMachine::with_initial(guard, self.initial_phase.as_deref());
        let mut state = LessonState::new(descriptor.params);
        self.content.on_enter(machine.current(), &mut state);

        log::info!(
            "Lesson {} mounted at {} (pass mark {}/{})",
            descriptor.id,
            machine.current(),
            config.pass_threshold,
            descriptor.questions.len()
        );

        Ok(LessonRuntime {
            quiz: QuizEngine::with_threshold(descriptor.questions, config.pass_threshold),
            transfer: TransferTracker::new(descriptor.applications.len()),
            content: self.content,
            config,
            machine,
            state,
            sink: self.sink,
            on_phase_complete: self.on_phase_complete,
            on_lesson_complete: self.on_lesson_complete,
            mastery_emitted: false,
        })
    }
}

pub struct LessonRuntime {
    content: Box<dyn LessonContent>,
    config: RuntimeConfig,
    machine: PhaseStateMachine,
    state: LessonState,
    quiz: QuizEngine,
    transfer: TransferTracker,
    sink: Box<dyn EventSink>,
    on_phase_complete: Option<PhaseCallback>,
    on_lesson_complete: Option<CompleteCallback>,
    /// Mastery is celebrated once per session
    mastery_emitted: bool,
}

impl LessonRuntime {
    pub fn builder(content: impl LessonContent + 'static) -> LessonBuilder {
        LessonBuilder {
            content: Box::new(content),
            config: RuntimeConfig::default(),
            initial_phase: None,
            sink: Box::new(NullSink),
            on_phase_complete: None,
            on_lesson_complete: None,
        }
    }

    // === Queries ===

    pub fn descriptor(&self) -> &'static LessonDescriptor {
        self.content.descriptor()
    }

    pub fn phase(&self) -> Phase {
        self.machine.current()
    }

    pub fn state(&self) -> &LessonState {
        &self.state
    }

    pub fn quiz(&self) -> &QuizEngine {
        &self.quiz
    }

    pub fn transfer(&self) -> &TransferTracker {
        &self.transfer
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_transitioning(&self, now_ms: f64) -> bool {
        self.machine.is_transitioning(now_ms)
    }

    pub fn lock_release_ms(&self) -> f64 {
        self.machine.guard().lock_ms()
    }

    /// Whether "Next" is enabled in the current phase
    pub fn can_advance(&self) -> bool {
        let ctx = GateContext {
            state: &self.state,
            transfer: &self.transfer,
            quiz: &self.quiz,
            required_milestones: self.descriptor().required_milestones,
        };
        can_advance(self.phase(), &ctx)
    }

    pub fn quiz_review(&self) -> Option<Vec<QuestionReview>> {
        self.quiz.review()
    }

    // === Navigation ===

    /// Advance to the following phase if the current gate allows it
    pub fn next(&mut self, now_ms: f64) -> bool {
        if !self.can_advance() {
            log::debug!("Next blocked in {}", self.phase());
            return false;
        }
        let transition = self.machine.next(now_ms);
        self.apply_transition(transition, now_ms)
    }

    /// Step back one phase. Never gated.
    pub fn prev(&mut self, now_ms: f64) -> bool {
        let transition = self.machine.prev(now_ms);
        self.apply_transition(transition, now_ms)
    }

    /// Jump straight to a phase (progress dots). Never gated.
    pub fn go_to(&mut self, target: Phase, now_ms: f64) -> bool {
        let transition = self.machine.go_to(target, now_ms);
        self.apply_transition(transition, now_ms)
    }

    /// Scheduled release of the navigation lock
    pub fn release_lock(&mut self) {
        self.machine.release_lock();
    }

    /// Follow a host-controlled phase. Host wins; no transition event is
    /// emitted since the host initiated the change.
    pub fn sync_external(&mut self, external: Option<&str>, now_ms: f64) -> bool {
        let Some(transition) = self.machine.sync_external(external) else {
            return false;
        };
        log::info!("Host moved lesson {} -> {}", transition.from, transition.to);
        self.content.on_enter(transition.to, &mut self.state);
        if transition.to == Phase::Mastery {
            self.celebrate_mastery(now_ms);
        }
        true
    }

    fn apply_transition(&mut self, transition: Option<Transition>, now_ms: f64) -> bool {
        let Some(Transition { from, to }) = transition else {
            return false;
        };
        self.content.on_enter(to, &mut self.state);
        log::info!("Phase {} -> {}", from, to);

        self.emit(EventKind::PhaseChanged { from, to }, now_ms);
        if let Some(f) = self.on_phase_complete.as_mut() {
            f(from);
        }
        self.cue(Cue::Transition);

        if to == Phase::Mastery {
            self.celebrate_mastery(now_ms);
        }
        true
    }

    fn celebrate_mastery(&mut self, now_ms: f64) {
        if self.mastery_emitted {
            return;
        }
        let Some(result) = self.quiz.result().filter(|r| r.passed) else {
            return;
        };
        self.mastery_emitted = true;
        log::info!("Mastery achieved in {} ({}/{})", self.descriptor().id, result.score, result.total);
        self.emit(
            EventKind::MasteryAchieved {
                score: result.score,
                total: result.total,
            },
            now_ms,
        );
        self.cue(Cue::Complete);
        if let Some(f) = self.on_lesson_complete.as_mut() {
            f(result);
        }
    }

    // === Predictions ===

    /// Record the predict-phase choice. Unknown tags are ignored.
    pub fn select_prediction(&mut self, tag: &str, now_ms: f64) -> bool {
        if !self.descriptor().predictions.iter().any(|o| o.tag == tag) {
            log::warn!("Unknown prediction {:?}", tag);
            return false;
        }
        self.state.prediction = Some(tag.to_string());
        self.emit(EventKind::PredictionMade { prediction: tag.to_string() }, now_ms);
        self.cue(Cue::Click);
        true
    }

    pub fn select_twist_prediction(&mut self, tag: &str, now_ms: f64) -> bool {
        if !self.descriptor().twist_predictions.iter().any(|o| o.tag == tag) {
            log::warn!("Unknown twist prediction {:?}", tag);
            return false;
        }
        self.state.twist_prediction = Some(tag.to_string());
        self.emit(EventKind::TwistPredictionMade { prediction: tag.to_string() }, now_ms);
        self.cue(Cue::Click);
        true
    }

    /// Whether the learner's prediction matched the outcome
    pub fn prediction_correct(&self) -> Option<bool> {
        let tag = self.state.prediction.as_deref()?;
        Some(tag == self.descriptor().prediction_answer)
    }

    pub fn twist_prediction_correct(&self) -> Option<bool> {
        let tag = self.state.twist_prediction.as_deref()?;
        Some(tag == self.descriptor().twist_answer)
    }

    // === Simulation ===

    /// Move a slider. Returns the clamped value, `None` for an unknown key.
    pub fn set_param(&mut self, key: &str, value: f64, now_ms: f64) -> Option<f64> {
        let stored = self.state.set_param(key, value)?;
        self.emit(
            EventKind::ParameterChanged {
                key: key.to_string(),
                value: stored,
            },
            now_ms,
        );
        let seen = self.content.observe(self.phase(), &self.state);
        for milestone in seen {
            self.note_milestone(milestone, now_ms);
        }
        Some(stored)
    }

    /// Record a milestone triggered by an explicit learner action
    /// (e.g. pressing "measure"). Returns `true` the first time only.
    pub fn record_milestone(&mut self, name: &str, now_ms: f64) -> bool {
        let Some(milestone) = self.descriptor().milestone(name) else {
            log::warn!("Unknown milestone {:?} for {}", name, self.descriptor().id);
            return false;
        };
        self.note_milestone(milestone, now_ms)
    }

    fn note_milestone(&mut self, milestone: &'static str, now_ms: f64) -> bool {
        if !self.state.record_milestone(milestone) {
            return false;
        }
        log::info!("Milestone {}", milestone);
        self.emit(
            EventKind::SimulationMilestone {
                milestone: milestone.to_string(),
            },
            now_ms,
        );
        self.cue(Cue::Success);
        true
    }

    /// Advance the cosmetic animation clock
    pub fn tick(&mut self, dt_seconds: f64) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.state.anim_time += dt_seconds;
        }
    }

    // === Transfer ===

    /// Open an application card. Returns `true` on the first visit.
    pub fn open_application(&mut self, index: usize, now_ms: f64) -> bool {
        if !self.transfer.mark_visited(index) {
            return false;
        }
        let title = self.descriptor().applications[index].title;
        self.emit(
            EventKind::ApplicationExplored {
                index,
                title: title.to_string(),
            },
            now_ms,
        );
        self.cue(Cue::Click);
        true
    }

    /// Focus a card without marking it visited
    pub fn select_application(&mut self, index: usize) -> bool {
        self.transfer.select(index)
    }

    // === Quiz ===

    pub fn select_answer(&mut self, question: usize, tag: &str, now_ms: f64) -> bool {
        if !self.quiz.select_answer(question, tag) {
            return false;
        }
        let correct = self.quiz.questions()[question].is_correct(tag);
        self.emit(
            EventKind::TestAnswered {
                question,
                selected: tag.to_string(),
                correct,
            },
            now_ms,
        );
        self.cue(Cue::Click);
        true
    }

    pub fn go_to_question(&mut self, index: usize) {
        self.quiz.go_to_question(index);
    }

    pub fn next_question(&mut self) -> bool {
        self.quiz.next_question()
    }

    pub fn prev_question(&mut self) -> bool {
        self.quiz.prev_question()
    }

    /// Grade the quiz. `None` while answers are missing; a second call returns
    /// the stored result without emitting again.
    pub fn submit_quiz(&mut self, now_ms: f64) -> Option<QuizResult> {
        if let Some(result) = self.quiz.result() {
            return Some(result);
        }
        let result = self.quiz.submit()?;
        log::info!(
            "Quiz submitted: {}/{} ({})",
            result.score,
            result.total,
            if result.passed { "pass" } else { "fail" }
        );
        self.emit(
            EventKind::TestCompleted {
                score: result.score,
                total: result.total,
                passed: result.passed,
            },
            now_ms,
        );
        self.cue(if result.passed { Cue::Success } else { Cue::Failure });
        Some(result)
    }

    /// Start the quiz over after a graded attempt. Returns `false` (and emits
    /// nothing) when there is no attempt to retry.
    pub fn retry_quiz(&mut self, now_ms: f64) -> bool {
        let Some(previous) = self.quiz.result() else {
            return false;
        };
        self.quiz.retry();
        self.emit(
            EventKind::QuizRetried {
                previous_score: previous.score,
            },
            now_ms,
        );
        true
    }

    // === Side effects ===

    fn emit(&mut self, kind: EventKind, now_ms: f64) {
        let event = GameEvent::new(kind, self.content.descriptor().id, now_ms);
        self.sink.emit(event);
    }

    fn cue(&self, cue: Cue) {
        audio::play(cue, self.config.effective_volume());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lessons::wave_interference::{CONSTRUCTIVE_FOUND, DESTRUCTIVE_FOUND};
    use crate::lessons::{SpeedOfSound, WaveInterference};
    use crate::runtime::events::EventLog;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn runtime_with_log(initial: Option<&str>) -> (LessonRuntime, EventLog) {
        let log = EventLog::new();
        let runtime = LessonRuntime::builder(WaveInterference)
            .initial_phase(initial)
            .sink(log.clone())
            .build()
            .unwrap();
        (runtime, log)
    }

    #[test]
    fn test_starts_at_hook() {
        let (rt, log) = runtime_with_log(None);
        assert_eq!(rt.phase(), Phase::Hook);
        assert!(log.is_empty());
    }

    #[test]
    fn test_invalid_initial_phase_falls_back() {
        let (rt, _) = runtime_with_log(Some("warmup"));
        assert_eq!(rt.phase(), Phase::Hook);
        let (rt, _) = runtime_with_log(Some("twist_play"));
        assert_eq!(rt.phase(), Phase::TwistPlay);
    }

    #[test]
    fn test_double_click_emits_once() {
        let (mut rt, log) = runtime_with_log(None);
        assert!(rt.go_to(Phase::Review, 0.0));
        assert!(!rt.go_to(Phase::Transfer, 120.0));
        assert_eq!(rt.phase(), Phase::Review);
        assert_eq!(log.count("phase_changed"), 1);
    }

    #[test]
    fn test_predict_gate_blocks_next() {
        let (mut rt, log) = runtime_with_log(None);
        assert!(rt.next(0.0));
        assert_eq!(rt.phase(), Phase::Predict);
        assert!(!rt.next(1000.0));
        assert!(!rt.select_prediction("z", 1000.0));
        assert!(rt.select_prediction("b", 1000.0));
        assert_eq!(rt.prediction_correct(), Some(true));
        assert!(rt.next(2000.0));
        assert_eq!(rt.phase(), Phase::Play);
        assert_eq!(log.count("prediction_made"), 1);
    }

    #[test]
    fn test_prev_is_never_gated() {
        let (mut rt, _) = runtime_with_log(Some("predict"));
        assert!(rt.prev(0.0));
        assert_eq!(rt.phase(), Phase::Hook);
        assert!(!rt.prev(1000.0));
    }

    #[test]
    fn test_entering_play_resets_probe() {
        let (mut rt, _) = runtime_with_log(Some("play"));
        rt.set_param("probe_x", 150.0, 0.0);
        assert!(rt.go_to(Phase::Review, 0.0));
        assert!(rt.go_to(Phase::Play, 1000.0));
        assert_eq!(rt.state().param("probe_x"), Some(25.0));
    }

    #[test]
    fn test_milestones_unlock_play_once() {
        let (mut rt, log) = runtime_with_log(Some("play"));
        assert!(!rt.can_advance());

        rt.set_param("probe_x", 0.0, 0.0);
        rt.set_param("probe_x", 0.0, 10.0);
        assert!(rt.state().has_milestone(CONSTRUCTIVE_FOUND));
        assert_eq!(log.count("simulation_milestone"), 1);
        assert!(!rt.can_advance());

        assert!(rt.record_milestone(DESTRUCTIVE_FOUND, 20.0));
        assert!(!rt.record_milestone(DESTRUCTIVE_FOUND, 30.0));
        assert!(!rt.record_milestone("bogus", 30.0));
        assert!(rt.can_advance());
        assert_eq!(log.count("simulation_milestone"), 2);

        // Moving the probe away doesn't close the gate again
        rt.set_param("probe_x", 25.0, 40.0);
        assert!(rt.can_advance());
    }

    #[test]
    fn test_application_explored_once() {
        let (mut rt, log) = runtime_with_log(Some("transfer"));
        assert!(rt.open_application(0, 0.0));
        assert!(!rt.open_application(0, 1.0));
        assert!(!rt.open_application(99, 1.0));
        assert_eq!(log.count("application_explored"), 1);
        assert_eq!(rt.transfer().active(), 1);
    }

    #[test]
    fn test_submit_is_idempotent() {
        let (mut rt, log) = runtime_with_log(Some("test"));
        assert_eq!(rt.submit_quiz(0.0), None);
        for i in 0..10 {
            rt.select_answer(i, "a", 0.0);
        }
        let first = rt.submit_quiz(0.0).unwrap();
        let second = rt.submit_quiz(1.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(log.count("test_completed"), 1);
        assert_eq!(log.count("test_answered"), 10);
    }

    #[test]
    fn test_event_emitted_after_state_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = seen.clone();
        let mut rt = LessonRuntime::builder(SpeedOfSound)
            .sink(move |e: GameEvent| sink_seen.borrow_mut().push(e))
            .build()
            .unwrap();
        rt.next(0.0);
        let events = seen.borrow();
        assert_eq!(
            events[0].kind,
            EventKind::PhaseChanged { from: Phase::Hook, to: Phase::Predict }
        );
        assert_eq!(events[0].lesson, "speed_of_sound");
        assert_eq!(events[0].timestamp, 0.0);
    }

    #[test]
    fn test_phase_complete_callback_receives_left_phase() {
        let completed = Rc::new(RefCell::new(Vec::new()));
        let sink = completed.clone();
        let mut rt = LessonRuntime::builder(SpeedOfSound)
            .on_phase_complete(move |p| sink.borrow_mut().push(p))
            .build()
            .unwrap();
        rt.next(0.0);
        rt.go_to(Phase::Review, 1000.0);
        assert_eq!(*completed.borrow(), vec![Phase::Hook, Phase::Predict]);
    }

    #[test]
    fn test_host_sync_adopts_phase_silently() {
        let (mut rt, log) = runtime_with_log(None);
        assert!(rt.sync_external(Some("transfer"), 0.0));
        assert_eq!(rt.phase(), Phase::Transfer);
        assert!(!rt.sync_external(Some("??"), 0.0));
        assert!(!rt.sync_external(None, 0.0));
        assert!(log.is_empty());
        // Guard was reset, so an immediate learner transition still works
        assert!(rt.go_to(Phase::Test, 1.0));
    }

    #[test]
    fn test_retry_needs_a_graded_attempt() {
        let (mut rt, log) = runtime_with_log(Some("test"));
        rt.select_answer(0, "a", 0.0);
        assert!(!rt.retry_quiz(0.0));
        assert_eq!(rt.quiz().answer(0), Some("a"));
        assert_eq!(log.count("quiz_retried"), 0);

        for i in 0..10 {
            rt.select_answer(i, "a", 0.0);
        }
        let result = rt.submit_quiz(0.0).unwrap();
        assert!(rt.retry_quiz(1.0));
        assert_eq!(
            log.last().unwrap().kind,
            EventKind::QuizRetried { previous_score: result.score }
        );
        assert!(!rt.retry_quiz(2.0));
        assert_eq!(log.count("quiz_retried"), 1);
    }

    #[test]
    fn test_malformed_params_fail_build() {
        struct InvertedRange(&'static LessonDescriptor);

        impl LessonContent for InvertedRange {
            fn descriptor(&self) -> &'static LessonDescriptor {
                self.0
            }

            fn observe(&self, _phase: Phase, _state: &LessonState) -> Vec<&'static str> {
                Vec::new()
            }
        }

        let spec = crate::runtime::ParamSpec {
            key: "distance",
            label: "Distance",
            unit: "m",
            min: 10.0,
            max: 1.0,
            default: 5.0,
        };
        let descriptor: &'static LessonDescriptor = Box::leak(Box::new(LessonDescriptor {
            params: Box::leak(Box::new([spec])),
            ..crate::lessons::speed_of_sound::DESCRIPTOR
        }));
        let built = LessonRuntime::builder(InvertedRange(descriptor)).build();
        assert!(matches!(
            built.err(),
            Some(ContentError::InvalidParam { key: "distance", .. })
        ));
    }

    #[test]
    fn test_tick_only_moves_animation_clock() {
        let (mut rt, log) = runtime_with_log(None);
        rt.tick(0.05);
        rt.tick(-1.0);
        rt.tick(f64::NAN);
        assert!((rt.state().anim_time - 0.05).abs() < 1e-12);
        assert_eq!(rt.phase(), Phase::Hook);
        assert!(log.is_empty());
    }
}
