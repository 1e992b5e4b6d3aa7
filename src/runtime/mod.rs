//! Shared lesson runtime
//!
//! All progression logic lives here. This module must stay deterministic:
//! - Time only enters as caller-supplied millisecond timestamps
//! - No rendering or platform dependencies
//! - Misuse is a silent no-op, never a panic

pub mod events;
pub mod gate;
pub mod guard;
pub mod lesson;
pub mod machine;
pub mod phase;
pub mod quiz;
pub mod state;
pub mod transfer;

pub use events::{EventKind, EventLog, EventSink, GameEvent, NullSink};
pub use gate::{GateContext, can_advance};
pub use guard::NavigationGuard;
pub use lesson::{LessonBuilder, LessonRuntime};
pub use machine::{PhaseStateMachine, Transition};
pub use phase::Phase;
pub use quiz::{AnswerOption, Question, QuestionReview, QuizEngine, QuizResult};
pub use state::{LessonState, ParamSpec, SimParam};
pub use transfer::TransferTracker;
