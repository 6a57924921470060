//! # Audio Error Types
//!
//! Errors raised while decoding, analysing, editing and encoding audio.

use core_runtime::ErrorKind;
use thiserror::Error;

/// Errors that can occur during audio operations.
#[derive(Error, Debug)]
pub enum AudioError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Failed to open or read audio source.
    #[error("Failed to open audio source: {0}")]
    SourceError(String),

    /// Audio source is unavailable (network error, HTTP status, missing client).
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    // ========================================================================
    // Format/Codec Errors
    // ========================================================================
    /// Audio format is not recognized or cannot be parsed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// Codec is not supported by the decoder.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Audio format was detected but cannot be decoded.
    #[error("Cannot decode audio format: {0}")]
    FormatNotDecodable(String),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Error occurred during audio decoding.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Audio stream is corrupted or contains invalid data.
    #[error("Corrupted audio stream: {0}")]
    CorruptedStream(String),

    /// Decoder encountered an internal error.
    #[error("Decoder internal error: {0}")]
    DecoderError(String),

    /// The source decoded to zero frames.
    #[error("Audio source contains no samples")]
    EmptyStream,

    /// The decoded audio would exceed the configured frame limit.
    #[error("Audio too long: {frames} frames exceeds limit of {limit}")]
    TooLong { frames: u64, limit: u64 },

    // ========================================================================
    // Buffer & Edit Errors
    // ========================================================================
    /// Channel data does not form a valid buffer.
    #[error("Invalid sample buffer: {0}")]
    InvalidBuffer(String),

    /// Trim bounds outside `0 <= start < end <= duration`.
    #[error("Range {start}s..{end}s is outside 0..{duration}s")]
    OutOfRange { start: f64, end: f64, duration: f64 },

    /// Trim bounds were valid but round to zero frames.
    #[error("Range {start}s..{end}s contains no frames")]
    EmptyRange { start: f64, end: f64 },

    /// Silence duration is not a positive finite number of frames.
    #[error("Invalid silence duration: {0}")]
    InvalidSilence(String),

    /// The edit would produce more frames than allowed.
    #[error("Edit result of {frames} frames exceeds limit of {limit}")]
    EditTooLarge { frames: u64, limit: u64 },

    // ========================================================================
    // Encoding Errors
    // ========================================================================
    /// WAV encoding failed.
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Internal task failure.
    #[error("Internal audio error: {0}")]
    Internal(String),
}

impl AudioError {
    /// Coarse classification for hosts.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudioError::SourceError(_)
            | AudioError::SourceUnavailable(_)
            | AudioError::InvalidFormat(_)
            | AudioError::UnsupportedCodec(_)
            | AudioError::FormatNotDecodable(_)
            | AudioError::DecodingError(_)
            | AudioError::CorruptedStream(_)
            | AudioError::DecoderError(_)
            | AudioError::EmptyStream
            | AudioError::TooLong { .. } => ErrorKind::Decode,
            AudioError::OutOfRange { .. } | AudioError::EmptyRange { .. } => ErrorKind::Range,
            AudioError::InvalidBuffer(_)
            | AudioError::InvalidSilence(_)
            | AudioError::EditTooLarge { .. }
            | AudioError::EncodeError(_) => ErrorKind::Validation,
            AudioError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the source could not be fetched.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            AudioError::SourceError(_) | AudioError::SourceUnavailable(_)
        )
    }

    /// Returns `true` for format or codec errors.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AudioError::InvalidFormat(_)
                | AudioError::UnsupportedCodec(_)
                | AudioError::FormatNotDecodable(_)
        )
    }

    /// Returns `true` for any failure to turn a source into a buffer.
    pub fn is_decode_error(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AudioError::EmptyStream.kind(), ErrorKind::Decode);
        assert_eq!(
            AudioError::TooLong { frames: 10, limit: 5 }.kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            AudioError::OutOfRange {
                start: 1.0,
                end: 0.5,
                duration: 2.0
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(
            AudioError::InvalidSilence("-1".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(AudioError::SourceUnavailable("404".into()).is_source_error());
        assert!(AudioError::UnsupportedCodec("opus".into()).is_format_error());
        assert!(AudioError::CorruptedStream("x".into()).is_decode_error());
        assert!(!AudioError::EmptyRange { start: 0.0, end: 0.0 }.is_decode_error());
    }

    #[test]
    fn test_error_display() {
        let err = AudioError::OutOfRange {
            start: 0.5,
            end: 3.0,
            duration: 2.0,
        };
        assert_eq!(err.to_string(), "Range 0.5s..3s is outside 0..2s");
    }
}
