//! Speed of sound: timing an echo off a distant wall

use super::{Application, LessonContent, LessonDescriptor, PredictionOption};
use crate::runtime::{AnswerOption, LessonState, ParamSpec, Phase, Question};

/// Speed of sound in dry air at 0 °C (m/s)
pub const SPEED_AT_ZERO_C: f64 = 331.3;
const KELVIN_OFFSET: f64 = 273.15;

/// Speed of sound in dry air (m/s) at `temp_c` degrees Celsius
pub fn speed_of_sound(temp_c: f64) -> f64 {
    SPEED_AT_ZERO_C * (1.0 + temp_c / KELVIN_OFFSET).max(0.0).sqrt()
}

/// Round-trip echo delay (seconds) for a wall `distance_m` away
pub fn echo_delay(distance_m: f64, temp_c: f64) -> f64 {
    let v = speed_of_sound(temp_c);
    if v <= 0.0 { f64::INFINITY } else { 2.0 * distance_m / v }
}

pub const ECHO_MEASURED: &str = "echo_measured";
pub const COLD_MEASURED: &str = "cold_measured";
pub const HOT_MEASURED: &str = "hot_measured";

const COLD_LIMIT_C: f64 = 0.0;
const HOT_LIMIT_C: f64 = 30.0;

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        key: "distance",
        label: "Distance to wall",
        unit: "m",
        min: 50.0,
        max: 1000.0,
        default: 340.0,
    },
    ParamSpec {
        key: "temperature",
        label: "Air temperature",
        unit: "°C",
        min: -20.0,
        max: 40.0,
        default: 20.0,
    },
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
    opts4(1, ["About 30 m/s", "About 343 m/s", "About 3,000 m/s", "About 300,000 km/s"]),
    opts4(2, ["0.5 s", "1 s", "2 s", "4 s"]),
    opts4(0, ["It speeds up", "It slows down", "It stays the same", "It stops"]),
    opts4(3, ["Louder clap", "Higher pitch", "Closer wall", "Warmer air"]),
    opts4(1, ["Sound travels faster in a vacuum", "Molecules pass vibrations along faster", "Air gets thinner", "Wavelength shrinks"]),
    opts4(2, ["170 m", "340 m", "680 m", "1,360 m"]),
    opts4(0, ["Lightning is seen before thunder is heard", "Thunder arrives first", "They always arrive together", "Neither can be timed"]),
    opts4(3, ["Air", "Vacuum", "Helium balloon", "Steel rail"]),
    opts4(1, ["It doubles", "It barely changes", "It halves", "It drops to zero"]),
    opts4(2, ["Light is reflected", "Pitch rises", "Echo delay shrinks", "Echo disappears"]),
];

static QUESTIONS: [Question; 10] = [
    Question {
        scenario: "You clap at room temperature.",
        prompt: "Roughly how fast does the sound travel?",
        options: &Q_OPTS[0],
        explanation: "At 20 °C sound moves at about 343 m/s.",
    },
    Question {
        scenario: "A cliff stands 343 m away on a 20 °C day.",
        prompt: "How long until you hear the echo?",
        options: &Q_OPTS[1],
        explanation: "The sound travels 686 m there and back: 686 / 343 = 2 s.",
    },
    Question {
        scenario: "The air warms from 0 °C to 30 °C.",
        prompt: "What happens to the speed of sound?",
        options: &Q_OPTS[2],
        explanation: "Speed grows with the square root of absolute temperature.",
    },
    Question {
        scenario: "You want a shorter echo delay without moving.",
        prompt: "Which change helps?",
        options: &Q_OPTS[3],
        explanation: "Warmer air carries sound faster, so the echo returns sooner.",
    },
    Question {
        scenario: "A student asks why warm air is faster.",
        prompt: "What is the best explanation?",
        options: &Q_OPTS[4],
        explanation: "Faster-moving molecules hand the pressure wave along more quickly.",
    },
    Question {
        scenario: "An echo returns after 4 s on a 20 °C day.",
        prompt: "How far away is the wall?",
        options: &Q_OPTS[5],
        explanation: "343 m/s × 4 s = 1,372 m round trip, so roughly 680 m each way.",
    },
    Question {
        scenario: "A storm is approaching.",
        prompt: "Why can you estimate its distance?",
        options: &Q_OPTS[6],
        explanation: "Light is effectively instant; the thunder lag reveals the distance.",
    },
    Question {
        scenario: "You put your ear to different materials.",
        prompt: "Where does sound travel fastest?",
        options: &Q_OPTS[7],
        explanation: "Stiff solids like steel carry sound at thousands of m/s.",
    },
    Question {
        scenario: "You clap twice as loudly.",
        prompt: "What happens to the speed of the sound?",
        options: &Q_OPTS[8],
        explanation: "Loudness changes amplitude, not speed.",
    },
    Question {
        scenario: "A bat hunts on a hot summer night.",
        prompt: "Compared to a cold night, what changes for its sonar?",
        options: &Q_OPTS[9],
        explanation: "Faster sound in warm air means echoes come back sooner.",
    },
];

pub static DESCRIPTOR: LessonDescriptor = LessonDescriptor {
    id: "speed_of_sound",
    title: "The Speed of Sound",
    hook: "Shout at a canyon wall and your voice comes back a moment later. How long is that moment?",
    predict_prompt: "What sets how long the echo takes to return?",
    predictions: &[
        PredictionOption { tag: "a", text: "How loud you shout" },
        PredictionOption { tag: "b", text: "The distance to the wall" },
        PredictionOption { tag: "c", text: "The pitch of your voice" },
    ],
    prediction_answer: "b",
    twist_prompt: "On a freezing morning, what happens to the echo delay?",
    twist_predictions: &[
        PredictionOption { tag: "a", text: "It gets shorter" },
        PredictionOption { tag: "b", text: "It gets longer" },
        PredictionOption { tag: "c", text: "Nothing changes" },
    ],
    twist_answer: "b",
    params: PARAMS,
    milestones: &[ECHO_MEASURED, COLD_MEASURED, HOT_MEASURED],
    required_milestones: &[ECHO_MEASURED],
    applications: &[
        Application {
            title: "Sonar",
            description: "Ships time echoes from the sea floor to map depth.",
            stat: "1,500 m/s in seawater",
        },
        Application {
            title: "Thunder distance",
            description: "Count seconds between flash and rumble, divide by three for kilometres.",
            stat: "~3 s per km",
        },
        Application {
            title: "Concert hall design",
            description: "Architects shape reflections so echoes arrive within 50 ms.",
            stat: "< 50 ms",
        },
        Application {
            title: "Ultrasound imaging",
            description: "Echo timing inside the body builds an image of organs.",
            stat: "1,540 m/s in tissue",
        },
    ],
    questions: &QUESTIONS,
};

/// Echo-timing lesson
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedOfSound;

impl LessonContent for SpeedOfSound {
    fn descriptor(&self) -> &'static LessonDescriptor {
        &DESCRIPTOR
    }

    /// The echo measurement itself is an explicit learner action; only the
    /// twist's temperature extremes are observed from sliders.
    fn observe(&self, phase: Phase, state: &LessonState) -> Vec<&'static str> {
        if phase != Phase::TwistPlay {
            return Vec::new();
        }
        let temp = state.param_or_zero("temperature");
        let mut found = Vec::new();
        if temp <= COLD_LIMIT_C {
            found.push(COLD_MEASURED);
        }
        if temp >= HOT_LIMIT_C {
            found.push(HOT_MEASURED);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_at_reference_temperatures() {
        assert!((speed_of_sound(0.0) - 331.3).abs() < 1e-9);
        assert!((speed_of_sound(20.0) - 343.2).abs() < 0.1);
        assert!(speed_of_sound(-20.0) < speed_of_sound(40.0));
    }

    #[test]
    fn test_echo_delay() {
        let delay = echo_delay(343.2, 20.0);
        assert!((delay - 2.0).abs() < 0.01);
        // Colder air, longer delay
        assert!(echo_delay(340.0, -10.0) > echo_delay(340.0, 30.0));
    }

    #[test]
    fn test_observe_only_in_twist_play() {
        let mut state = LessonState::new(PARAMS);
        state.set_param("temperature", -15.0);
        assert!(SpeedOfSound.observe(Phase::Play, &state).is_empty());
        assert_eq!(SpeedOfSound.observe(Phase::TwistPlay, &state), vec![COLD_MEASURED]);
        state.set_param("temperature", 35.0);
        assert_eq!(SpeedOfSound.observe(Phase::TwistPlay, &state), vec![HOT_MEASURED]);
    }
}
