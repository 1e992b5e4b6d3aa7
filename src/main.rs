//! Physics Lessons entry point
//!
//! On the web the host mounts lessons through `WebLesson`; this only sets up
//! logging. Natively it plays every catalog lesson start to finish with a
//! scripted learner and logs the telemetry stream.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    physics_lessons::platform::web::init_logging();
    log::info!("Physics Lessons ready");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use physics_lessons::LessonContent;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Physics Lessons (native) walkthrough");

    let mut failures = 0;
    for lesson in physics_lessons::lessons::catalog() {
        match walkthrough::run(lesson) {
            Ok(result) => println!(
                "✓ {}: {}/{} mastered",
                lesson.descriptor().id,
                result.score,
                result.total
            ),
            Err(e) => {
                failures += 1;
                log::error!("{}: {}", lesson.descriptor().id, e);
            }
        }
    }
    if failures > 0 {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod walkthrough {
    use thiserror::Error;

    use physics_lessons::LessonContent;
    use physics_lessons::lessons::ContentError;
    use physics_lessons::platform::{Clock, ManualClock, ManualTicker, Ticker};
    use physics_lessons::runtime::{EventLog, LessonRuntime, Phase, QuizResult};

    /// Why a scripted run stopped short of mastery
    #[derive(Debug, Error)]
    pub enum WalkError {
        #[error("invalid content: {0}")]
        Content(#[from] ContentError),
        #[error("could not leave {0}")]
        Stuck(Phase),
        #[error("quiz not passed")]
        NotPassed,
    }

    /// Play one lesson with correct answers, returning the final quiz result
    pub fn run(lesson: &'static dyn LessonContent) -> Result<QuizResult, WalkError> {
        let descriptor = lesson.descriptor();
        let events = EventLog::new();
        let clock = ManualClock::new(0.0);
        let mut runtime = LessonRuntime::builder(lesson)
            .sink(events.clone())
            .on_lesson_complete(|r| log::info!("Lesson complete: {}/{}", r.score, r.total))
            .build()?;

        let mut ticker = ManualTicker::new();
        let anim = std::rc::Rc::new(std::cell::Cell::new(0.0));
        let anim_sink = anim.clone();
        ticker.start(
            runtime.config().tick_ms,
            Box::new(move |dt| anim_sink.set(anim_sink.get() + dt)),
        );

        while runtime.phase() != Phase::Mastery {
            match runtime.phase() {
                Phase::Predict => {
                    runtime.select_prediction(descriptor.prediction_answer, clock.now_ms());
                }
                Phase::Play => {
                    for milestone in descriptor.required_milestones {
                        runtime.record_milestone(milestone, clock.now_ms());
                    }
                }
                Phase::TwistPredict => {
                    runtime.select_twist_prediction(descriptor.twist_answer, clock.now_ms());
                }
                Phase::Transfer => {
                    for i in 0..descriptor.applications.len() {
                        runtime.open_application(i, clock.now_ms());
                    }
                }
                Phase::Test => {
                    for (i, question) in descriptor.questions.iter().enumerate() {
                        if let Some(tag) = question.correct_tag() {
                            runtime.select_answer(i, tag, clock.now_ms());
                        }
                    }
                    runtime.submit_quiz(clock.now_ms());
                }
                _ => {}
            }

            let from = runtime.phase();
            if !runtime.next(clock.now_ms()) {
                return Err(WalkError::Stuck(from));
            }
            // Let the lock lapse before the next click
            let wait = runtime.lock_release_ms() + 1.0;
            clock.advance(wait);
            ticker.advance(wait);
        }

        for event in events.events() {
            log::debug!("{}", event.to_json().unwrap_or_default());
        }
        log::info!(
            "{}: {} events, {:.1}s of animation",
            descriptor.id,
            events.len(),
            anim.get()
        );

        runtime
            .quiz()
            .result()
            .filter(|r| r.passed)
            .ok_or(WalkError::NotPassed)
    }
}
