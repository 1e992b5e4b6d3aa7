//! Per-lesson learner state
//!
//! Owned by a single [`LessonRuntime`](super::LessonRuntime); never shared
//! between lesson instances.

use std::collections::BTreeSet;

use serde::Serialize;

/// Static description of a slider-controlled simulation parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// A bounded real-valued simulation parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimParam {
    pub spec: ParamSpec,
    value: f64,
}

impl SimParam {
    pub fn new(spec: ParamSpec) -> Self {
        Self {
            spec,
            value: spec.default.clamp(spec.min, spec.max),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, clamped to `[min, max]`. NaN is ignored.
    /// Returns the stored value.
    pub fn set(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            self.value = value.clamp(self.spec.min, self.spec.max);
        }
        self.value
    }

    pub fn reset(&mut self) {
        self.value = self.spec.default.clamp(self.spec.min, self.spec.max);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LessonState {
    /// Option tag chosen in the predict phase
    pub prediction: Option<String>,
    /// Option tag chosen in the twist-predict phase
    pub twist_prediction: Option<String>,
    params: Vec<SimParam>,
    /// Discovery flags; once recorded they stay set for the session
    milestones: BTreeSet<&'static str>,
    /// Cosmetic animation clock (seconds), advanced by the ticker
    pub anim_time: f64,
}

impl LessonState {
    pub fn new(params: &[ParamSpec]) -> Self {
        Self {
            params: params.iter().copied().map(SimParam::new).collect(),
            ..Default::default()
        }
    }

    pub fn params(&self) -> &[SimParam] {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.params
            .iter()
            .find(|p| p.spec.key == key)
            .map(SimParam::value)
    }

    /// Like [`param`](Self::param) but falls back to 0.0 for unknown keys
    pub fn param_or_zero(&self, key: &str) -> f64 {
        self.param(key).unwrap_or(0.0)
    }

    /// Set a parameter by key. Returns the clamped value, or `None` for an unknown key.
    pub fn set_param(&mut self, key: &str, value: f64) -> Option<f64> {
        self.params
            .iter_mut()
            .find(|p| p.spec.key == key)
            .map(|p| p.set(value))
    }

    pub fn reset_params(&mut self) {
        for param in &mut self.params {
            param.reset();
        }
    }

    /// Record a milestone. Returns `true` only the first time.
    pub fn record_milestone(&mut self, milestone: &'static str) -> bool {
        self.milestones.insert(milestone)
    }

    pub fn has_milestone(&self, milestone: &str) -> bool {
        self.milestones.contains(milestone)
    }

    pub fn milestones(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.milestones.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTANCE: ParamSpec = ParamSpec {
        key: "distance",
        label: "Distance",
        unit: "m",
        min: 10.0,
        max: 500.0,
        default: 100.0,
    };

    #[test]
    fn test_param_clamped() {
        let mut state = LessonState::new(&[DISTANCE]);
        assert_eq!(state.param("distance"), Some(100.0));
        assert_eq!(state.set_param("distance", 9000.0), Some(500.0));
        assert_eq!(state.set_param("distance", -1.0), Some(10.0));
        assert_eq!(state.set_param("distance", f64::NAN), Some(10.0));
        assert_eq!(state.set_param("height", 1.0), None);
    }

    #[test]
    fn test_reset_params() {
        let mut state = LessonState::new(&[DISTANCE]);
        state.set_param("distance", 250.0);
        state.reset_params();
        assert_eq!(state.param_or_zero("distance"), 100.0);
        assert_eq!(state.param_or_zero("missing"), 0.0);
    }

    #[test]
    fn test_milestone_recorded_once() {
        let mut state = LessonState::new(&[]);
        assert!(state.record_milestone("measured"));
        assert!(!state.record_milestone("measured"));
        assert!(state.has_milestone("measured"));
        assert_eq!(state.milestones().count(), 1);
    }
}
