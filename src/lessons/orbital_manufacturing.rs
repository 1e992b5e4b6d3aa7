//! Orbital manufacturing: growing crystals without convection

use super::{Application, LessonContent, LessonDescriptor, PredictionOption};
use crate::runtime::{AnswerOption, LessonState, ParamSpec, Phase, Question};

pub const MICROGRAVITY_REACHED: &str = "microgravity_reached";
pub const PERFECT_CRYSTAL: &str = "perfect_crystal";

/// Gravity (in g) at or below which convection is negligible
pub const MICROGRAVITY_LIMIT: f64 = 0.01;
/// Quality percentage that counts as a flawless crystal
pub const PERFECT_QUALITY: f64 = 95.0;

/// How strongly buoyant convection scales with gravity
const CONVECTION_FACTOR: f64 = 9.0;
/// Quality lost per K/min of cooling above the slowest rate
const COOLING_PENALTY: f64 = 0.02;
const SLOWEST_COOLING: f64 = 1.0;

/// Relative convection strength in the melt (1.0 at Earth gravity)
pub fn convection(gravity_g: f64) -> f64 {
    gravity_g.max(0.0)
}

/// Crystal quality as a percentage (0..=100)
pub fn crystal_quality(gravity_g: f64, cooling_rate: f64) -> f64 {
    let flow = 1.0 / (1.0 + CONVECTION_FACTOR * convection(gravity_g));
    let thermal = 1.0 - COOLING_PENALTY * (cooling_rate - SLOWEST_COOLING).max(0.0);
    (100.0 * flow * thermal).clamp(0.0, 100.0)
}

const PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "gravity", label: "Gravity", unit: "g", min: 0.0, max: 1.0, default: 1.0 },
    ParamSpec { key: "cooling_rate", label: "Cooling rate", unit: "K/min", min: 1.0, max: 20.0, default: 10.0 },
];

const fn opts4(correct: usize, texts: [&'static str; 4]) -> [AnswerOption; 4] {
    [
        AnswerOption { tag: "a", text: texts[0], correct: correct == 0 },
        AnswerOption { tag: "b", text: texts[1], correct: correct == 1 },
        AnswerOption { tag: "c", text: texts[2], correct: correct == 2 },
        AnswerOption { tag: "d", text: texts[3], correct: correct == 3 },
    ]
}

static Q_OPTS: [[AnswerOption; 4]; 10] = [
    opts4(1, ["Radiation", "Buoyant convection", "Magnetism", "Friction"]),
    opts4(0, ["Almost none", "Twice as much", "The same", "It reverses"]),
    opts4(2, ["Colder temperatures", "Vacuum of space", "No sedimentation or convection", "Cosmic rays"]),
    opts4(3, ["It speeds up", "It is unchanged", "It becomes magnetic", "Defects increase"]),
    opts4(0, ["Launch cost", "Lack of sunlight", "Too much gravity", "Crystals float away"]),
    opts4(1, ["Steel beams", "Fibre optic glass", "Concrete", "Timber"]),
    opts4(2, ["Heavier molecules rise", "All molecules sink equally", "Denser components settle out", "Nothing separates"]),
    opts4(3, ["Faster spin", "Larger furnace", "More gravity", "Slower, controlled cooling"]),
    opts4(0, ["Protein crystals for drug design", "Bricks", "Bread", "Plastic bags"]),
    opts4(1, ["It is always perfect", "It still depends on cooling rate", "It is always worse", "It cannot be measured"]),
];

static QUESTIONS: [Question; 10] = [
    Question {
        scenario: "Hot fluid in a furnace on Earth rises while cool fluid sinks.",
        prompt: "What is this flow called?",
        options: &Q_OPTS[0],
        explanation: "Density differences under gravity drive buoyant convection.",
    },
    Question {
        scenario: "The same furnace runs aboard an orbiting station.",
        prompt: "How much convection occurs?",
        options: &Q_OPTS[1],
        explanation: "In free fall the effective gravity is near zero, so buoyancy vanishes.",
    },
    Question {
        scenario: "Engineers compare orbital and ground-grown semiconductor crystals.",
        prompt: "Why are orbital crystals more uniform?",
        options: &Q_OPTS[2],
        explanation: "Without gravity nothing settles and no currents stir the melt.",
    },
    Question {
        scenario: "A melt in orbit is cooled very quickly.",
        prompt: "What happens to crystal quality?",
        options: &Q_OPTS[3],
        explanation: "Rapid cooling traps defects even without convection.",
    },
    Question {
        scenario: "A startup plans a factory in orbit.",
        prompt: "What is the main economic obstacle?",
        options: &Q_OPTS[4],
        explanation: "Getting material to orbit and back is expensive.",
    },
    Question {
        scenario: "A product must carry light with very few impurities.",
        prompt: "Which is a leading candidate for orbital manufacturing?",
        options: &Q_OPTS[5],
        explanation: "ZBLAN fibre drawn in microgravity avoids crystallite defects.",
    },
    Question {
        scenario: "A mixed alloy solidifies slowly on Earth.",
        prompt: "What does gravity do to its composition?",
        options: &Q_OPTS[6],
        explanation: "Sedimentation pulls denser components to the bottom.",
    },
    Question {
        scenario: "An orbital crystal still shows defects.",
        prompt: "What should be changed?",
        options: &Q_OPTS[7],
        explanation: "Once convection is gone, cooling rate dominates quality.",
    },
    Question {
        scenario: "Pharmaceutical researchers send samples to orbit.",
        prompt: "What are they most likely growing?",
        options: &Q_OPTS[8],
        explanation: "Larger, more ordered protein crystals give clearer structures.",
    },
    Question {
        scenario: "Gravity is set to zero in the simulator.",
        prompt: "What is true about crystal quality?",
        options: &Q_OPTS[9],
        explanation: "Microgravity removes convection, but thermal history still matters.",
    },
];

pub static DESCRIPTOR: LessonDescriptor = LessonDescriptor {
    id: "orbital_manufacturing",
    title: "Manufacturing in Orbit",
    hook: "Some of the purest crystals ever made were grown 400 km above Earth. What does orbit offer that a factory can't?",
    predict_prompt: "What happens to a crystal grown with less gravity?",
    predictions: &[
        PredictionOption { tag: "a", text: "It grows with more defects" },
        PredictionOption { tag: "b", text: "It grows more uniformly" },
        PredictionOption { tag: "c", text: "Gravity makes no difference" },
    ],
    prediction_answer: "b",
    twist_prompt: "In microgravity, does cooling speed still matter?",
    twist_predictions: &[
        PredictionOption { tag: "a", text: "No, every crystal is perfect" },
        PredictionOption { tag: "b", text: "Yes, fast cooling still causes defects" },
        PredictionOption { tag: "c", text: "Faster cooling is better" },
    ],
    twist_answer: "b",
    params: PARAMS,
    milestones: &[MICROGRAVITY_REACHED, PERFECT_CRYSTAL],
    required_milestones: &[MICROGRAVITY_REACHED],
    applications: &[
        Application {
            title: "ZBLAN optical fibre",
            description: "Fluoride glass fibre drawn in orbit could carry signals with far less loss.",
            stat: "up to 100× lower loss",
        },
        Application {
            title: "Protein crystallography",
            description: "Better crystals reveal drug targets in sharper detail.",
            stat: "hundreds of ISS experiments",
        },
        Application {
            title: "Semiconductor wafers",
            description: "Uniform doping without convection improves chip yield.",
            stat: "fewer dislocations",
        },
        Application {
            title: "Bioprinting",
            description: "Soft tissue can be printed without collapsing under its own weight.",
            stat: "no scaffolding needed",
        },
    ],
    questions: &QUESTIONS,
};

/// Microgravity crystal-growth lesson
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitalManufacturing;

impl LessonContent for OrbitalManufacturing {
    fn descriptor(&self) -> &'static LessonDescriptor {
        &DESCRIPTOR
    }

    fn observe(&self, phase: Phase, state: &LessonState) -> Vec<&'static str> {
        let gravity = state.param_or_zero("gravity");
        let cooling = state.param_or_zero("cooling_rate");
        match phase {
            Phase::Play if gravity <= MICROGRAVITY_LIMIT => vec![MICROGRAVITY_REACHED],
            Phase::TwistPlay if crystal_quality(gravity, cooling) >= PERFECT_QUALITY => {
                vec![PERFECT_CRYSTAL]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_improves_with_less_gravity() {
        assert!(crystal_quality(0.0, 10.0) > crystal_quality(0.5, 10.0));
        assert!(crystal_quality(0.5, 10.0) > crystal_quality(1.0, 10.0));
        assert_eq!(crystal_quality(0.0, 1.0), 100.0);
    }

    #[test]
    fn test_fast_cooling_limits_quality_in_orbit() {
        let q = crystal_quality(0.0, 20.0);
        assert!(q < PERFECT_QUALITY, "q = {q}");
        assert!((q - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_observe() {
        let mut state = LessonState::new(PARAMS);
        assert!(OrbitalManufacturing.observe(Phase::Play, &state).is_empty());
        state.set_param("gravity", 0.0);
        assert_eq!(
            OrbitalManufacturing.observe(Phase::Play, &state),
            vec![MICROGRAVITY_REACHED]
        );
        // Default cooling is too fast for a perfect crystal
        assert!(OrbitalManufacturing.observe(Phase::TwistPlay, &state).is_empty());
        state.set_param("cooling_rate", 2.0);
        assert_eq!(
            OrbitalManufacturing.observe(Phase::TwistPlay, &state),
            vec![PERFECT_CRYSTAL]
        );
    }
}
