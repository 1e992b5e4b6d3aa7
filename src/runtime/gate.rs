//! Per-phase "Next" gating

use super::phase::Phase;
use super::quiz::QuizEngine;
use super::state::LessonState;
use super::transfer::TransferTracker;

/// Read-only slice of lesson state the gates look at
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub state: &'a LessonState,
    pub transfer: &'a TransferTracker,
    pub quiz: &'a QuizEngine,
    /// Milestones that complete the play phase
    pub required_milestones: &'a [&'static str],
}

impl GateContext<'_> {
    /// Every required milestone has been observed
    pub fn play_complete(&self) -> bool {
        self.required_milestones
            .iter()
            .all(|m| self.state.has_milestone(m))
    }
}

/// Whether the learner may advance past `phase`.
///
/// The test phase follows the quiz: it opens once a submitted quiz has passed.
/// Mastery is terminal and never advances.
pub fn can_advance(phase: Phase, ctx: &GateContext<'_>) -> bool {
    match phase {
        Phase::Hook | Phase::Review | Phase::TwistPlay | Phase::TwistReview => true,
        Phase::Predict => ctx.state.prediction.is_some(),
        Phase::Play => ctx.play_complete(),
        Phase::TwistPredict => ctx.state.twist_prediction.is_some(),
        Phase::Transfer => ctx.transfer.all_visited(),
        Phase::Test => ctx.quiz.passed(),
        Phase::Mastery => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    static NO_QUESTIONS: [crate::runtime::quiz::Question; 0] = [];

    struct Fixture {
        state: LessonState,
        transfer: TransferTracker,
        quiz: QuizEngine,
        required: Vec<&'static str>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: LessonState::new(&[]),
                transfer: TransferTracker::new(4),
                quiz: QuizEngine::new(&NO_QUESTIONS),
                required: vec!["constructive", "destructive"],
            }
        }

        fn can(&self, phase: Phase) -> bool {
            let ctx = GateContext {
                state: &self.state,
                transfer: &self.transfer,
                quiz: &self.quiz,
                required_milestones: &self.required,
            };
            can_advance(phase, &ctx)
        }
    }

    #[test]
    fn test_ungated_phases() {
        let f = Fixture::new();
        for phase in [Phase::Hook, Phase::Review, Phase::TwistPlay, Phase::TwistReview] {
            assert!(f.can(phase), "{phase} should be open");
        }
        assert!(!f.can(Phase::Mastery));
    }

    #[test]
    fn test_predictions_gate() {
        let mut f = Fixture::new();
        assert!(!f.can(Phase::Predict));
        assert!(!f.can(Phase::TwistPredict));
        f.state.prediction = Some("b".into());
        f.state.twist_prediction = Some("a".into());
        assert!(f.can(Phase::Predict));
        assert!(f.can(Phase::TwistPredict));
    }

    #[test]
    fn test_play_needs_every_milestone() {
        let mut f = Fixture::new();
        f.state.record_milestone("constructive");
        assert!(!f.can(Phase::Play));
        f.state.record_milestone("destructive");
        assert!(f.can(Phase::Play));
    }

    #[test]
    fn test_transfer_gate() {
        let mut f = Fixture::new();
        for i in 0..3 {
            f.transfer.mark_visited(i);
        }
        assert!(!f.can(Phase::Transfer));
        f.transfer.mark_visited(3);
        assert!(f.can(Phase::Transfer));
    }

    #[test]
    fn test_test_phase_needs_passing_quiz() {
        // An empty quiz with threshold 0 passes on submit
        let mut f = Fixture::new();
        f.quiz = QuizEngine::with_threshold(&NO_QUESTIONS, 0);
        assert!(!f.can(Phase::Test));
        f.quiz.submit();
        assert!(f.can(Phase::Test));
    }

    proptest! {
        #[test]
        fn milestone_and_transfer_gates_stay_open(
            cards in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
            extra_cards in proptest::collection::vec(0usize..4, 0..8),
            milestones in Just(vec!["constructive", "destructive"]).prop_shuffle(),
            noise in proptest::collection::vec(
                prop_oneof![Just("constructive"), Just("destructive"), Just("unrelated")],
                0..6,
            ),
        ) {
            let mut f = Fixture::new();

            let mut opened = false;
            for i in cards.into_iter().chain(extra_cards) {
                f.transfer.mark_visited(i);
                let now = f.can(Phase::Transfer);
                prop_assert!(!opened || now);
                opened = now;
            }
            prop_assert!(opened);

            let mut opened = false;
            for m in milestones.into_iter().chain(noise) {
                f.state.record_milestone(m);
                let now = f.can(Phase::Play);
                prop_assert!(!opened || now);
                opened = now;
            }
            prop_assert!(opened);
        }
    }
}
