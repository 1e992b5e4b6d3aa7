//! Lesson content plugins
//!
//! A lesson is static data (a [`LessonDescriptor`]) plus a small amount of
//! behaviour: which milestones the current slider values reveal, and what to
//! reset when a phase is entered. The runtime supplies everything else.

pub mod orbital_manufacturing;
pub mod speed_of_sound;
pub mod wave_interference;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::runtime::{LessonState, ParamSpec, Phase, Question};

pub use orbital_manufacturing::OrbitalManufacturing;
pub use speed_of_sound::SpeedOfSound;
pub use wave_interference::WaveInterference;

/// A choice offered in the predict and twist-predict phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionOption {
    pub tag: &'static str,
    pub text: &'static str,
}

/// A real-world application card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Application {
    pub title: &'static str,
    pub description: &'static str,
    /// Headline figure shown on the card
    pub stat: &'static str,
}

/// Everything static about a lesson
#[derive(Debug, Serialize)]
pub struct LessonDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub hook: &'static str,
    pub predict_prompt: &'static str,
    pub predictions: &'static [PredictionOption],
    /// Tag of the prediction the play phase confirms
    pub prediction_answer: &'static str,
    pub twist_prompt: &'static str,
    pub twist_predictions: &'static [PredictionOption],
    pub twist_answer: &'static str,
    pub params: &'static [ParamSpec],
    /// Every milestone the lesson can record
    pub milestones: &'static [&'static str],
    /// Milestones that unlock "Next" in the play phase
    pub required_milestones: &'static [&'static str],
    pub applications: &'static [Application],
    pub questions: &'static [Question],
}

/// Malformed lesson content. Caught by tests, never expected at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("lesson {lesson}: no quiz questions")]
    NoQuestions { lesson: &'static str },
    #[error("lesson {lesson}: question {index} has {count} correct options, expected exactly 1")]
    CorrectOptionCount {
        lesson: &'static str,
        index: usize,
        count: usize,
    },
    #[error("lesson {lesson}: question {index} repeats option tag {tag:?}")]
    DuplicateOptionTag {
        lesson: &'static str,
        index: usize,
        tag: &'static str,
    },
    #[error("lesson {lesson}: no application cards")]
    NoApplications { lesson: &'static str },
    #[error("lesson {lesson}: {phase} has no prediction options")]
    NoPredictionOptions { lesson: &'static str, phase: Phase },
    #[error("lesson {lesson}: answer {tag:?} is not one of the {phase} options")]
    UnknownPredictionAnswer {
        lesson: &'static str,
        phase: Phase,
        tag: &'static str,
    },
    #[error("lesson {lesson}: parameter {key:?} needs finite bounds with min <= max")]
    InvalidParam {
        lesson: &'static str,
        key: &'static str,
    },
    #[error("lesson {lesson}: parameter {key:?} is declared twice")]
    DuplicateParam {
        lesson: &'static str,
        key: &'static str,
    },
    #[error("lesson {lesson}: required milestone {milestone:?} is not declared")]
    UnknownMilestone {
        lesson: &'static str,
        milestone: &'static str,
    },
}

impl LessonDescriptor {
    /// Check content invariants: one correct option per question, unique option
    /// tags, non-empty option sets, well-formed slider ranges, declared
    /// milestones.
    pub fn validate(&self) -> Result<(), ContentError> {
        let lesson = self.id;
        if self.questions.is_empty() {
            return Err(ContentError::NoQuestions { lesson });
        }
        for (index, question) in self.questions.iter().enumerate() {
            let count = question.correct_count();
            if count != 1 {
                return Err(ContentError::CorrectOptionCount { lesson, index, count });
            }
            let mut seen = HashSet::new();
            if let Some(dup) = question.options.iter().find(|o| !seen.insert(o.tag)) {
                return Err(ContentError::DuplicateOptionTag {
                    lesson,
                    index,
                    tag: dup.tag,
                });
            }
        }
        if self.applications.is_empty() {
            return Err(ContentError::NoApplications { lesson });
        }
        for (phase, options, answer) in [
            (Phase::Predict, self.predictions, self.prediction_answer),
            (Phase::TwistPredict, self.twist_predictions, self.twist_answer),
        ] {
            if options.is_empty() {
                return Err(ContentError::NoPredictionOptions { lesson, phase });
            }
            if !options.iter().any(|o| o.tag == answer) {
                return Err(ContentError::UnknownPredictionAnswer {
                    lesson,
                    phase,
                    tag: answer,
                });
            }
        }
        let mut keys = HashSet::new();
        for spec in self.params {
            let finite = [spec.min, spec.max, spec.default].iter().all(|v| v.is_finite());
            if !finite || spec.min > spec.max {
                return Err(ContentError::InvalidParam { lesson, key: spec.key });
            }
            if !keys.insert(spec.key) {
                return Err(ContentError::DuplicateParam { lesson, key: spec.key });
            }
        }
        if let Some(missing) = self
            .required_milestones
            .iter()
            .copied()
            .find(|m| !self.milestones.contains(m))
        {
            return Err(ContentError::UnknownMilestone {
                lesson,
                milestone: missing,
            });
        }
        Ok(())
    }

    /// Resolve a host-supplied milestone name to its static tag
    pub fn milestone(&self, name: &str) -> Option<&'static str> {
        self.milestones.iter().copied().find(|m| *m == name)
    }
}

/// Behaviour a lesson plugs into the runtime
pub trait LessonContent {
    fn descriptor(&self) -> &'static LessonDescriptor;

    /// Milestones revealed by the current simulation state in `phase`.
    /// Already-recorded milestones may be returned again; the runtime dedups.
    fn observe(&self, phase: Phase, state: &LessonState) -> Vec<&'static str>;

    /// Reset phase-scoped state on entering `phase`. By default both
    /// simulation phases start from the lesson's slider defaults.
    fn on_enter(&self, phase: Phase, state: &mut LessonState) {
        if matches!(phase, Phase::Play | Phase::TwistPlay) {
            state.reset_params();
        }
    }
}

impl<T: LessonContent + ?Sized> LessonContent for &T {
    fn descriptor(&self) -> &'static LessonDescriptor {
        (**self).descriptor()
    }

    fn observe(&self, phase: Phase, state: &LessonState) -> Vec<&'static str> {
        (**self).observe(phase, state)
    }

    fn on_enter(&self, phase: Phase, state: &mut LessonState) {
        (**self).on_enter(phase, state)
    }
}

/// Every lesson shipped with the crate
pub fn catalog() -> [&'static dyn LessonContent; 3] {
    [&SpeedOfSound, &WaveInterference, &OrbitalManufacturing]
}

/// Look up a lesson by id
pub fn find(id: &str) -> Option<&'static dyn LessonContent> {
    catalog().into_iter().find(|l| l.descriptor().id == id)
}
