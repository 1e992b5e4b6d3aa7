//! Telemetry events handed to the host application
//!
//! Wire shape: `{"type": "...", "payload": {...}, "lesson": "...", "timestamp": ms}`.
//! Hosts key their analytics on `type`, so variant names are stable.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Event type tag plus its typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    PredictionMade {
        prediction: String,
    },
    TwistPredictionMade {
        prediction: String,
    },
    /// First observation of a simulation outcome
    SimulationMilestone {
        milestone: String,
    },
    ParameterChanged {
        key: String,
        value: f64,
    },
    /// First time an application card is opened
    ApplicationExplored {
        index: usize,
        title: String,
    },
    TestAnswered {
        question: usize,
        selected: String,
        correct: bool,
    },
    TestCompleted {
        score: usize,
        total: usize,
        passed: bool,
    },
    QuizRetried {
        previous_score: usize,
    },
    MasteryAchieved {
        score: usize,
        total: usize,
    },
}

impl EventKind {
    /// The wire `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::PhaseChanged { .. } => "phase_changed",
            EventKind::PredictionMade { .. } => "prediction_made",
            EventKind::TwistPredictionMade { .. } => "twist_prediction_made",
            EventKind::SimulationMilestone { .. } => "simulation_milestone",
            EventKind::ParameterChanged { .. } => "parameter_changed",
            EventKind::ApplicationExplored { .. } => "application_explored",
            EventKind::TestAnswered { .. } => "test_answered",
            EventKind::TestCompleted { .. } => "test_completed",
            EventKind::QuizRetried { .. } => "quiz_retried",
            EventKind::MasteryAchieved { .. } => "mastery_achieved",
        }
    }
}

/// An immutable telemetry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    /// Id of the lesson that produced the event
    pub lesson: String,
    /// Host clock, milliseconds
    pub timestamp: f64,
}

impl GameEvent {
    pub fn new(kind: EventKind, lesson: &str, timestamp: f64) -> Self {
        Self {
            kind,
            lesson: lesson.to_string(),
            timestamp,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Receiver for emitted events. Fire-and-forget: nothing flows back.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl<F: FnMut(GameEvent)> EventSink for F {
    fn emit(&mut self, event: GameEvent) {
        self(event)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

/// Shared in-memory recorder; clones see the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Number of recorded events with the given `type` tag
    pub fn count(&self, type_name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.type_name() == type_name)
            .count()
    }

    pub fn last(&self) -> Option<GameEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Take every recorded event, leaving the log empty
    pub fn drain(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GameEvent) {
        self.events.borrow_mut().push(event);
    }
}
