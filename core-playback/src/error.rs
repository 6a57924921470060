//! # Playback Error Types
//!
//! Errors raised by the transport state machine and host output adapters.

use crate::config::PlaybackState;
use core_runtime::ErrorKind;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Transport verb not allowed in the current state.
    #[error("Cannot {verb} while {state}")]
    InvalidState {
        verb: &'static str,
        state: PlaybackState,
    },

    /// Seek target outside `[0, 100]` percent or not a number.
    #[error("Seek position out of bounds: {0}%")]
    InvalidSeek(f64),

    /// Attempted operation when no audio is primed.
    #[error("No audio loaded")]
    NotLoaded,

    // ========================================================================
    // Platform/Adapter Errors
    // ========================================================================
    /// Host audio output refused a command.
    #[error("Playback adapter error: {0}")]
    AdapterError(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Coarse classification for hosts.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::InvalidState { .. }
            | PlaybackError::NotLoaded
            | PlaybackError::AdapterError(_) => ErrorKind::Playback,
            PlaybackError::InvalidSeek(_) => ErrorKind::Range,
            PlaybackError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the host output failed rather than the state machine.
    pub fn is_adapter_error(&self) -> bool {
        matches!(self, PlaybackError::AdapterError(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
