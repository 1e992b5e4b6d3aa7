//! Runtime tuning supplied by the host
//!
//! Every field has a default, so hosts only send what they override:
//! `{"pass_threshold": 8, "sound_enabled": false}`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Correct answers needed to pass the quiz
    pub pass_threshold: usize,
    /// Minimum spacing between accepted phase transitions (ms)
    pub debounce_ms: f64,
    /// How long a transition holds the navigation lock (ms)
    pub lock_release_ms: f64,
    /// Period of the cosmetic animation tick (ms)
    pub tick_ms: f64,

    // === Audio ===
    /// Play feedback beeps
    pub sound_enabled: bool,
    /// Beep volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            lock_release_ms: DEFAULT_LOCK_RELEASE_MS,
            tick_ms: DEFAULT_TICK_MS,
            sound_enabled: true,
            volume: 0.8,
        }
    }
}

impl RuntimeConfig {
    /// Parse host JSON. Malformed input falls back to defaults.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<RuntimeConfig>(json) {
            Ok(config) => config.validated(),
            Err(e) => {
                log::warn!("Invalid lesson config ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values into something usable
    pub fn validated(mut self) -> Self {
        if !self.debounce_ms.is_finite() || self.debounce_ms < 0.0 {
            self.debounce_ms = DEFAULT_DEBOUNCE_MS;
        }
        if !self.lock_release_ms.is_finite() || self.lock_release_ms < 0.0 {
            self.lock_release_ms = DEFAULT_LOCK_RELEASE_MS;
        }
        if !self.tick_ms.is_finite() || self.tick_ms < MIN_TICK_MS {
            self.tick_ms = DEFAULT_TICK_MS;
        }
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Effective beep volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled { self.volume } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json(r#"{"pass_threshold": 8}"#);
        assert_eq!(config.pass_threshold, 8);
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert!(config.sound_enabled);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert_eq!(RuntimeConfig::from_json("{not json"), RuntimeConfig::default());
        assert_eq!(
            RuntimeConfig::from_json(r#"{"pass_threshold": "seven"}"#),
            RuntimeConfig::default()
        );
    }

    #[test]
    fn test_validated_clamps() {
        let config = RuntimeConfig::from_json(
            r#"{"debounce_ms": -10, "tick_ms": 0, "volume": 3.5}"#,
        );
        assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.volume, 1.0);
    }

    #[test]
    fn test_effective_volume_respects_mute() {
        let config = RuntimeConfig {
            sound_enabled: false,
            ..Default::default()
        };
        assert_eq!(config.effective_volume(), 0.0);
        assert_eq!(RuntimeConfig::default().effective_volume(), 0.8);
    }
}
