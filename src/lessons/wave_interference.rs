//! Two-source wave interference: hunting for loud and silent spots

use std::f64::consts::{PI, TAU};

use glam::DVec2;

use super::{Application, LessonContent, LessonDescriptor, PredictionOption};
use crate::runtime::{AnswerOption, LessonState, ParamSpec, Phase, Question};

pub const CONSTRUCTIVE_FOUND: &str = "constructive_found";
pub const DESTRUCTIVE_FOUND: &str = "destructive_found";
pub const WAVELENGTH_EXPLORED: &str = "wavelength_explored";

/// Normalized amplitude at or above this counts as constructive
pub const CONSTRUCTIVE_THRESHOLD: f64 = 0.9;
/// Normalized amplitude at or below this counts as destructive
pub const DESTRUCTIVE_THRESHOLD: f64 = 0.1;

/// Wave speed used by the animation (px/s)
const WAVE_SPEED: f64 = 80.0;

/// Positions of the two in-phase sources, centred on the origin along x
pub fn sources(separation: f64) -> [DVec2; 2] {
    let half = separation / 2.0;
    [DVec2::new(-half, 0.0), DVec2::new(half, 0.0)]
}

/// Difference in distance from `point` to each source
pub fn path_difference(point: DVec2, separation: f64) -> f64 {
    let [s1, s2] = sources(separation);
    (point.distance(s1) - point.distance(s2)).abs()
}

/// Combined amplitude at `point`, normalized to 0..=1
pub fn amplitude(point: DVec2, separation: f64, wavelength: f64) -> f64 {
    if wavelength <= 0.0 {
        return 0.0;
    }
    (PI * path_difference(point, separation) / wavelength).cos().abs()
}

/// Instantaneous superposed displacement at `point` (range -2..=2), for the ripple animation
pub fn displacement(point: DVec2, separation: f64, wavelength: f64, time: f64) -> f64 {
    if wavelength <= 0.0 {
        return 0.0;
    }
    let k = TAU / wavelength;
    let omega = k * WAVE_SPEED;
    sources(separation)
        .iter()
        .map(|s| (k * point.distance(*s) - omega * time).sin())
        .sum()
}

fn probe(state: &LessonState) -> DVec2 {
    DVec2::new(state.param_or_zero("probe_x"), state.param_or_zero("probe_y"))
}

const PARAMS: &[ParamSpec] = &[
    ParamSpec { key: "wavelength", label: "Wavelength", unit: "px", min: 20.0, max: 80.0, default: 40.0 },
    ParamSpec { key: "separation", label: "Source separation", unit: "px", min: 40.0, max: 200.0, default: 120.0 },
    ParamSpec { key: "probe_x", label: "Probe x", unit: "px", min: -200.0, max: 200.0, default: 25.0 },
    ParamSpec { key: "probe_y", label: "Probe y", unit: "px", min: 20.0, max: 300.0, default: 150.0 },
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
    opts4(0, ["Zero or a whole number of wavelengths", "Half a wavelength", "A quarter wavelength", "Any amount"]),
    opts4(1, ["One wavelength", "Half a wavelength", "Two wavelengths", "Zero"]),
    opts4(2, ["It doubles", "It halves", "It is cancelled", "It is unchanged"]),
    opts4(3, ["The sources are out of sync", "The probe is too far", "The waves are too slow", "The paths differ by half a wavelength"]),
    opts4(0, ["Closer together", "Further apart", "Unchanged", "They vanish"]),
    opts4(1, ["Light has no wavelength", "Bright and dark fringes", "A single bright spot", "Uniform brightness"]),
    opts4(2, ["Loudness doubles everywhere", "Energy is destroyed", "Energy is redistributed", "Sound stops travelling"]),
    opts4(3, ["Louder speakers", "Mismatched frequencies", "Thicker air", "Anti-phase sound from headphones"]),
    opts4(0, ["Constructive", "Destructive", "Neither", "Both at once"]),
    opts4(1, ["The sources must differ in colour", "The sources must keep a fixed phase relation", "The sources must be far apart", "The sources must be loud"]),
];

static QUESTIONS: [Question; 10] = [
    Question {
        scenario: "Two speakers play the same tone in phase.",
        prompt: "Where is the sound loudest?",
        options: &Q_OPTS[0],
        explanation: "Crests meet crests when path lengths differ by 0, λ, 2λ, ...",
    },
    Question {
        scenario: "You find a quiet spot between two speakers.",
        prompt: "What path difference produces it?",
        options: &Q_OPTS[1],
        explanation: "A half-wavelength offset lines crests up with troughs.",
    },
    Question {
        scenario: "Two equal waves meet exactly out of phase.",
        prompt: "What happens to the combined amplitude?",
        options: &Q_OPTS[2],
        explanation: "Equal and opposite displacements sum to zero.",
    },
    Question {
        scenario: "A probe between two in-phase sources reads silence.",
        prompt: "Why?",
        options: &Q_OPTS[3],
        explanation: "Half-wavelength path difference means destructive interference.",
    },
    Question {
        scenario: "You shorten the wavelength of both sources.",
        prompt: "What happens to the loud and quiet bands?",
        options: &Q_OPTS[4],
        explanation: "Shorter wavelength packs the fringes closer together.",
    },
    Question {
        scenario: "Light passes through two narrow slits.",
        prompt: "What appears on the screen?",
        options: &Q_OPTS[5],
        explanation: "Young's experiment shows alternating fringes.",
    },
    Question {
        scenario: "Quiet spots appear in a room with two speakers.",
        prompt: "Where did the energy go?",
        options: &Q_OPTS[6],
        explanation: "Energy moves from quiet spots to loud ones; the total is conserved.",
    },
    Question {
        scenario: "A pilot wears headphones in a noisy cockpit.",
        prompt: "How do they cancel engine noise?",
        options: &Q_OPTS[7],
        explanation: "Noise-cancelling headphones emit an inverted copy of the noise.",
    },
    Question {
        scenario: "A probe sits on the centre line between two in-phase sources.",
        prompt: "What interference does it see?",
        options: &Q_OPTS[8],
        explanation: "Equal distances mean zero path difference: constructive.",
    },
    Question {
        scenario: "Two torches shine on a wall but no fringes appear.",
        prompt: "What is required to see interference?",
        options: &Q_OPTS[9],
        explanation: "Only coherent sources produce a stable pattern.",
    },
];

pub static DESCRIPTOR: LessonDescriptor = LessonDescriptor {
    id: "wave_interference",
    title: "Wave Interference",
    hook: "Two speakers, one tone. Walk across the room and the sound swells and fades. Why?",
    predict_prompt: "What happens where two equal waves meet?",
    predictions: &[
        PredictionOption { tag: "a", text: "They always get louder" },
        PredictionOption { tag: "b", text: "They can add up or cancel out" },
        PredictionOption { tag: "c", text: "They pass through without effect" },
    ],
    prediction_answer: "b",
    twist_prompt: "If the wavelength gets shorter, what happens to the pattern?",
    twist_predictions: &[
        PredictionOption { tag: "a", text: "Fringes spread out" },
        PredictionOption { tag: "b", text: "Fringes crowd together" },
        PredictionOption { tag: "c", text: "The pattern disappears" },
    ],
    twist_answer: "b",
    params: PARAMS,
    milestones: &[CONSTRUCTIVE_FOUND, DESTRUCTIVE_FOUND, WAVELENGTH_EXPLORED],
    required_milestones: &[CONSTRUCTIVE_FOUND, DESTRUCTIVE_FOUND],
    applications: &[
        Application {
            title: "Noise-cancelling headphones",
            description: "Microphones sample noise and speakers play its inverse.",
            stat: "up to 30 dB quieter",
        },
        Application {
            title: "Anti-reflection coatings",
            description: "Thin films cancel reflected light on camera lenses and glasses.",
            stat: "< 0.5% reflection",
        },
        Application {
            title: "Gravitational-wave detectors",
            description: "Laser interferometers sense length changes smaller than a proton.",
            stat: "10⁻¹⁹ m",
        },
        Application {
            title: "Radio telescope arrays",
            description: "Combining dishes by interference sharpens the image.",
            stat: "Earth-sized baselines",
        },
    ],
    questions: &QUESTIONS,
};

/// Two-source interference lesson
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveInterference;

impl LessonContent for WaveInterference {
    fn descriptor(&self) -> &'static LessonDescriptor {
        &DESCRIPTOR
    }

    fn observe(&self, phase: Phase, state: &LessonState) -> Vec<&'static str> {
        let wavelength = state.param_or_zero("wavelength");
        let separation = state.param_or_zero("separation");
        let mut found = Vec::new();
        match phase {
            Phase::Play => {
                let amp = amplitude(probe(state), separation, wavelength);
                if amp >= CONSTRUCTIVE_THRESHOLD {
                    found.push(CONSTRUCTIVE_FOUND);
                }
                if amp <= DESTRUCTIVE_THRESHOLD {
                    found.push(DESTRUCTIVE_FOUND);
                }
            }
            Phase::TwistPlay => {
                let default = PARAMS[0].default;
                if (wavelength - default).abs() > f64::EPSILON {
                    found.push(WAVELENGTH_EXPLORED);
                }
            }
            _ => {}
        }
        found
    }
}
