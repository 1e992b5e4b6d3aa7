//! Feedback beeps using the Web Audio API
//!
//! Procedurally generated, no sound files. Each call builds its own
//! short-lived `AudioContext`; nothing is kept between calls. Failures
//! (no audio support, autoplay policy) are swallowed.

/// Feedback sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Option picked, card opened
    Click,
    /// Milestone found, quiz passed
    Success,
    /// Quiz failed
    Failure,
    /// Phase changed
    Transition,
    /// Mastery reached
    Complete,
}

impl Cue {
    /// (frequency Hz, start offset s) for each note of the cue
    fn notes(self) -> &'static [(f32, f64)] {
        match self {
            Cue::Click => &[(600.0, 0.0)],
            Cue::Success => &[(523.0, 0.0), (659.0, 0.1), (784.0, 0.2)],
            Cue::Failure => &[(300.0, 0.0), (200.0, 0.15)],
            Cue::Transition => &[(440.0, 0.0)],
            Cue::Complete => &[(523.0, 0.0), (659.0, 0.08), (784.0, 0.16), (1047.0, 0.24)],
        }
    }

    /// Length of each note (s)
    fn note_length(self) -> f64 {
        match self {
            Cue::Click | Cue::Transition => 0.08,
            Cue::Failure => 0.25,
            Cue::Success | Cue::Complete => 0.2,
        }
    }
}

/// Play a cue at `volume` (0.0 - 1.0). Fire-and-forget.
#[cfg(target_arch = "wasm32")]
pub fn play(cue: Cue, volume: f32) {
    if volume <= 0.0 {
        return;
    }
    if web::play(cue, volume.min(1.0)).is_none() {
        log::debug!("Audio unavailable, skipped {:?}", cue);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn play(cue: Cue, volume: f32) {
    if volume > 0.0 {
        log::trace!(
            "cue {:?} ({} notes, {:.2}s each)",
            cue,
            cue.notes().len(),
            cue.note_length()
        );
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::Cue;

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    pub(super) fn play(cue: Cue, vol: f32) -> Option<()> {
        let ctx = AudioContext::new().ok()?;
        let osc_type = match cue {
            Cue::Failure => OscillatorType::Sawtooth,
            Cue::Click | Cue::Transition => OscillatorType::Triangle,
            Cue::Success | Cue::Complete => OscillatorType::Sine,
        };
        let length = cue.note_length();
        let mut end = 0.0;

        for (freq, offset) in cue.notes() {
            let (osc, gain) = create_osc(&ctx, *freq, osc_type)?;
            let t = ctx.current_time() + offset;
            gain.gain().set_value_at_time(vol * 0.3, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok()?;
            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + length + 0.02).ok()?;
            end = f64::max(end, offset + length);
        }

        // Release the context once the last note has finished
        let ctx_for_close = ctx.clone();
        let closure = wasm_bindgen::closure::Closure::once_into_js(move || {
            let _ = ctx_for_close.close();
        });
        web_sys::window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.unchecked_ref(),
                ((end + 0.1) * 1000.0) as i32,
            )
            .ok()?;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cue_has_notes() {
        for cue in [Cue::Click, Cue::Success, Cue::Failure, Cue::Transition, Cue::Complete] {
            assert!(!cue.notes().is_empty());
            assert!(cue.note_length() > 0.0);
        }
    }

    #[test]
    fn test_play_is_silent_noop_natively() {
        play(Cue::Complete, 1.0);
        play(Cue::Click, 0.0);
    }
}
