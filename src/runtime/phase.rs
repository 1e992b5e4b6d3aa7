//! The fixed ten-stage lesson sequence

use serde::{Deserialize, Serialize};

/// One stage of the lesson sequence
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Opening question that frames the lesson
    #[default]
    Hook,
    /// Learner commits to a prediction
    Predict,
    /// Interactive simulation
    Play,
    /// Explanation of what the simulation showed
    Review,
    /// Prediction for the twist scenario
    TwistPredict,
    /// Simulation with the twist applied
    TwistPlay,
    /// Explanation of the twist
    TwistReview,
    /// Real-world application cards
    Transfer,
    /// Scored quiz
    Test,
    /// Terminal stage, reached after passing the quiz
    Mastery,
}

impl Phase {
    /// Every phase in lesson order
    pub const ALL: [Phase; 10] = [
        Phase::Hook,
        Phase::Predict,
        Phase::Play,
        Phase::Review,
        Phase::TwistPredict,
        Phase::TwistPlay,
        Phase::TwistReview,
        Phase::Transfer,
        Phase::Test,
        Phase::Mastery,
    ];

    /// Phase a freshly mounted lesson starts in
    pub const INITIAL: Phase = Phase::Hook;

    /// Position in the sequence (0-based)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Phase> {
        Self::ALL.get(index).copied()
    }

    /// Following phase, or `None` at mastery
    pub fn next(self) -> Option<Phase> {
        Self::from_index(self.index() + 1)
    }

    /// Preceding phase, or `None` at the hook
    pub fn prev(self) -> Option<Phase> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Wire identifier used in events and host props
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Hook => "hook",
            Phase::Predict => "predict",
            Phase::Play => "play",
            Phase::Review => "review",
            Phase::TwistPredict => "twist_predict",
            Phase::TwistPlay => "twist_play",
            Phase::TwistReview => "twist_review",
            Phase::Transfer => "transfer",
            Phase::Test => "test",
            Phase::Mastery => "mastery",
        }
    }

    /// Label shown on the progress dots
    pub fn label(self) -> &'static str {
        match self {
            Phase::Hook => "Hook",
            Phase::Predict => "Predict",
            Phase::Play => "Lab",
            Phase::Review => "Review",
            Phase::TwistPredict => "Twist Predict",
            Phase::TwistPlay => "Twist Lab",
            Phase::TwistReview => "Twist Review",
            Phase::Transfer => "Transfer",
            Phase::Test => "Test",
            Phase::Mastery => "Mastery",
        }
    }

    /// Parse a host-supplied phase name.
    ///
    /// Accepts snake_case, kebab-case and camelCase spellings in any letter case.
    /// Unknown names yield `None`, which callers treat as "no phase supplied".
    pub fn parse(s: &str) -> Option<Phase> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "hook" => Some(Phase::Hook),
            "predict" => Some(Phase::Predict),
            "play" => Some(Phase::Play),
            "review" => Some(Phase::Review),
            "twistpredict" => Some(Phase::TwistPredict),
            "twistplay" => Some(Phase::TwistPlay),
            "twistreview" => Some(Phase::TwistReview),
            "transfer" => Some(Phase::Transfer),
            "test" => Some(Phase::Test),
            "mastery" => Some(Phase::Mastery),
            _ => None,
        }
    }

    /// Fraction of the sequence completed on entering this phase (0.0 at hook, 1.0 at mastery)
    pub fn progress(self) -> f32 {
        self.index() as f32 / (Self::ALL.len() - 1) as f32
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sequence_ends() {
        assert_eq!(Phase::Hook.prev(), None);
        assert_eq!(Phase::Mastery.next(), None);
        assert_eq!(Phase::Hook.next(), Some(Phase::Predict));
        assert_eq!(Phase::Mastery.prev(), Some(Phase::Test));
    }

    #[test]
    fn test_index_matches_order() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
            assert_eq!(Phase::from_index(i), Some(*phase));
        }
        assert_eq!(Phase::from_index(10), None);
    }

    #[test]
    fn test_parse_spellings() {
        assert_eq!(Phase::parse("twist_predict"), Some(Phase::TwistPredict));
        assert_eq!(Phase::parse("twist-play"), Some(Phase::TwistPlay));
        assert_eq!(Phase::parse("twistReview"), Some(Phase::TwistReview));
        assert_eq!(Phase::parse(" MASTERY "), Some(Phase::Mastery));
        assert_eq!(Phase::parse("quiz"), None);
        assert_eq!(Phase::parse(""), None);
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for phase in Phase::ALL {
            assert_eq!(Phase::parse(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(Phase::Hook.progress(), 0.0);
        assert_eq!(Phase::Mastery.progress(), 1.0);
    }

    proptest! {
        #[test]
        fn prev_reaches_preceding_index(i in 1usize..10) {
            let phase = Phase::from_index(i).unwrap();
            prop_assert_eq!(phase.prev().map(Phase::index), Some(i - 1));
        }

        #[test]
        fn next_then_prev_is_identity(i in 0usize..9) {
            let phase = Phase::from_index(i).unwrap();
            prop_assert_eq!(phase.next().and_then(Phase::prev), Some(phase));
        }
    }
}
