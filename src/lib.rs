//! Physics Lessons - interactive micro-lessons on a shared runtime
//!
//! Core modules:
//! - `runtime`: Deterministic phase progression, gating, quiz and transfer tracking
//! - `lessons`: Content plugins (questions, applications, display physics)
//! - `platform`: Browser/native clocks, timers and the JS-facing handle
//! - `settings`: Host-supplied tuning
//! - `audio`: Fire-and-forget feedback beeps

pub mod audio;
pub mod lessons;
pub mod platform;
pub mod runtime;
pub mod settings;

pub use lessons::{ContentError, LessonContent, LessonDescriptor};
pub use runtime::{EventKind, GameEvent, LessonRuntime, Phase, QuizResult};
pub use settings::RuntimeConfig;

/// Lesson tuning defaults
pub mod consts {
    /// Correct answers needed to pass (out of `QUESTION_COUNT`)
    pub const DEFAULT_PASS_THRESHOLD: usize = 7;
    /// Questions per quiz in the shipped lessons
    pub const QUESTION_COUNT: usize = 10;
    /// Application cards per transfer phase in the shipped lessons
    pub const APPLICATION_COUNT: usize = 4;

    /// Minimum spacing between accepted transitions (ms)
    pub const DEFAULT_DEBOUNCE_MS: f64 = 300.0;
    /// In-flight lock held after an accepted transition (ms)
    pub const DEFAULT_LOCK_RELEASE_MS: f64 = 400.0;

    /// Cosmetic animation tick period (ms)
    pub const DEFAULT_TICK_MS: f64 = 50.0;
    /// Fastest tick the config accepts (ms)
    pub const MIN_TICK_MS: f64 = 10.0;
}
