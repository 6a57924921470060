use bridge_traits::BridgeError;
use core_audio::AudioError;
use core_playback::PlaybackError;
use core_runtime::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    // ========================================================================
    // Initialization
    // ========================================================================
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    // ========================================================================
    // Session preconditions
    // ========================================================================
    #[error("No audio loaded")]
    NotLoaded,

    #[error("A load is in progress")]
    LoadInProgress,

    #[error("Selection required for {operation}")]
    SelectionRequired { operation: &'static str },

    #[error("Invalid gesture: {0}")]
    InvalidGesture(String),

    // ========================================================================
    // Component errors
    // ========================================================================
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Sink error: {0}")]
    Sink(#[from] BridgeError),
}

impl CoreError {
    /// Coarse classification for hosts.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InitializationFailed(_) => ErrorKind::Internal,
            CoreError::Runtime(e) => e.kind(),
            CoreError::NotLoaded
            | CoreError::LoadInProgress
            | CoreError::SelectionRequired { .. }
            | CoreError::InvalidGesture(_) => ErrorKind::Validation,
            CoreError::Audio(e) => e.kind(),
            CoreError::Playback(e) => e.kind(),
            CoreError::Sink(_) => ErrorKind::Sink,
        }
    }

    pub fn is_decode_error(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
