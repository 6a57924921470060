//! # Playback Configuration
//!
//! Cadence settings and the transport state enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Playback controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often progress is pushed to observers while playing.
    ///
    /// Default: 16 ms (about 60 Hz).
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
        }
    }
}

impl PlaybackConfig {
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_interval.is_zero() {
            return Err("progress_interval must be > 0".to_string());
        }
        Ok(())
    }
}

fn default_progress_interval() -> Duration {
    Duration::from_millis(16)
}

// ============================================================================
// Playback State
// ============================================================================

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing loaded.
    Idle,
    /// A source is being decoded.
    Loading,
    /// Cursor advancing with the clock.
    Playing,
    /// Media primed, cursor stationary.
    Paused,
    /// The last load failed.
    Error,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Error => "error",
        }
    }

    /// Returns `true` if media is primed (`Playing` or `Paused`).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.progress_interval, Duration::from_millis(16));
        assert!(config.validate().is_ok());
        assert!(config
            .with_progress_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_state_helpers() {
        assert!(PlaybackState::Paused.is_active());
        assert!(PlaybackState::Playing.is_active());
        assert!(!PlaybackState::Loading.is_active());
        assert_eq!(PlaybackState::Error.to_string(), "error");
    }
}
