//! # Format Detection Module
//!
//! Builds probe hints for Symphonia and maps codec types onto [`AudioCodec`].

use crate::error::{AudioError, Result};
use crate::traits::AudioCodec;
use std::path::Path;
use symphonia::core::codecs::CodecType;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Format detector for encoded audio.
pub struct FormatDetector;

impl FormatDetector {
    /// Create a probe hint from a file path extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_audio::FormatDetector;
    /// use std::path::Path;
    ///
    /// let hint = FormatDetector::hint_from_path(Path::new("/takes/line-4.flac"));
    /// ```
    pub fn hint_from_path(path: &Path) -> Hint {
        let mut hint = Hint::new();

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            debug!("Setting probe hint extension: {}", extension);
            hint.with_extension(extension);
        } else {
            debug!("No file extension found, probe will auto-detect");
        }

        hint
    }

    /// Create a probe hint from a MIME type such as `audio/mpeg`.
    pub fn hint_from_mime_type(mime_type: &str) -> Hint {
        let mut hint = Hint::new();
        debug!("Creating probe hint from MIME type: {}", mime_type);
        hint.mime_type(mime_type);
        hint
    }

    /// Create a probe hint for a downloaded resource.
    ///
    /// The URL path extension wins; the response content type is the fallback.
    pub fn hint_from_url(url: &str, content_type: Option<&str>) -> Hint {
        match Self::url_extension(url) {
            Some(extension) => {
                let mut hint = Hint::new();
                debug!("Setting probe hint extension from URL: {}", extension);
                hint.with_extension(&extension);
                hint
            }
            None => match content_type {
                Some(mime) => Self::hint_from_mime_type(mime),
                None => Hint::new(),
            },
        }
    }

    /// Extension of the last path segment, ignoring query and fragment.
    pub fn url_extension(url: &str) -> Option<String> {
        let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
        let path = &url[..end];
        let after_scheme = path.find("://").map(|idx| idx + 3).unwrap_or(0);
        let path = &path[after_scheme..];
        // First segment is the host
        let segment = path.split('/').skip(1).last()?;
        let (_, extension) = segment.rsplit_once('.')?;

        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(extension.to_ascii_lowercase())
    }

    /// Map a Symphonia codec type onto [`AudioCodec`].
    pub fn detect_codec(codec_type: CodecType) -> AudioCodec {
        use symphonia::core::codecs::*;

        if codec_type == CODEC_TYPE_MP3 {
            AudioCodec::Mp3
        } else if codec_type == CODEC_TYPE_AAC {
            AudioCodec::Aac
        } else if codec_type == CODEC_TYPE_FLAC {
            AudioCodec::Flac
        } else if codec_type == CODEC_TYPE_VORBIS {
            AudioCodec::Vorbis
        } else if codec_type == CODEC_TYPE_OPUS {
            AudioCodec::Opus
        } else if codec_type == CODEC_TYPE_ALAC {
            AudioCodec::Alac
        } else if codec_type == CODEC_TYPE_PCM_S16LE
            || codec_type == CODEC_TYPE_PCM_S16BE
            || codec_type == CODEC_TYPE_PCM_S24LE
            || codec_type == CODEC_TYPE_PCM_S24BE
            || codec_type == CODEC_TYPE_PCM_S32LE
            || codec_type == CODEC_TYPE_PCM_S32BE
            || codec_type == CODEC_TYPE_PCM_U8
            || codec_type == CODEC_TYPE_PCM_S8
            || codec_type == CODEC_TYPE_PCM_F32LE
            || codec_type == CODEC_TYPE_PCM_F32BE
            || codec_type == CODEC_TYPE_PCM_F64LE
            || codec_type == CODEC_TYPE_PCM_F64BE
            || codec_type == CODEC_TYPE_PCM_ALAW
            || codec_type == CODEC_TYPE_PCM_MULAW
        {
            AudioCodec::Wav
        } else {
            warn!("Unknown codec type: {:?}", codec_type);
            AudioCodec::Unknown
        }
    }

    /// Check that the linked Symphonia build can decode `codec`.
    ///
    /// The workspace enables Symphonia's `all` feature, which covers every
    /// codec here except Opus.
    pub fn validate_codec_support(codec: &AudioCodec) -> Result<()> {
        match codec {
            AudioCodec::Mp3
            | AudioCodec::Aac
            | AudioCodec::Flac
            | AudioCodec::Vorbis
            | AudioCodec::Wav
            | AudioCodec::Alac => Ok(()),
            AudioCodec::Opus => Err(AudioError::UnsupportedCodec(
                "Opus decoding is not available".to_string(),
            )),
            AudioCodec::Unknown => Err(AudioError::UnsupportedCodec(
                "Unknown audio codec".to_string(),
            )),
            AudioCodec::Other(name) => Err(AudioError::UnsupportedCodec(format!(
                "Unsupported codec: {}",
                name
            ))),
        }
    }

    /// Common file extension for a codec.
    pub fn codec_extension(codec: &AudioCodec) -> &'static str {
        match codec {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Aac => "m4a",
            AudioCodec::Flac => "flac",
            AudioCodec::Vorbis => "ogg",
            AudioCodec::Opus => "opus",
            AudioCodec::Wav => "wav",
            AudioCodec::Alac => "m4a",
            AudioCodec::Unknown => "bin",
            AudioCodec::Other(_) => "bin",
        }
    }

    /// MIME type for a codec.
    pub fn codec_mime_type(codec: &AudioCodec) -> &'static str {
        match codec {
            AudioCodec::Mp3 => "audio/mpeg",
            AudioCodec::Aac => "audio/mp4",
            AudioCodec::Flac => "audio/flac",
            AudioCodec::Vorbis => "audio/ogg",
            AudioCodec::Opus => "audio/opus",
            AudioCodec::Wav => "audio/wav",
            AudioCodec::Alac => "audio/mp4",
            AudioCodec::Unknown => "application/octet-stream",
            AudioCodec::Other(_) => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::codecs::{CODEC_TYPE_FLAC, CODEC_TYPE_OPUS, CODEC_TYPE_PCM_S16LE};

    #[test]
    fn test_url_extension() {
        assert_eq!(
            FormatDetector::url_extension("https://cdn.example.com/vo/line.MP3?sig=abc"),
            Some("mp3".to_string())
        );
        assert_eq!(
            FormatDetector::url_extension("https://cdn.example.com/vo/line.wav#t=2"),
            Some("wav".to_string())
        );
        assert_eq!(
            FormatDetector::url_extension("https://cdn.example.com/stream"),
            None
        );
        assert_eq!(FormatDetector::url_extension("https://cdn.example.com"), None);
        assert_eq!(
            FormatDetector::url_extension("https://cdn.example.com/dir/"),
            None
        );
    }

    #[test]
    fn test_detect_codec() {
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_FLAC), AudioCodec::Flac);
        assert_eq!(
            FormatDetector::detect_codec(CODEC_TYPE_PCM_S16LE),
            AudioCodec::Wav
        );
        assert_eq!(FormatDetector::detect_codec(CODEC_TYPE_OPUS), AudioCodec::Opus);
    }

    #[test]
    fn test_codec_extension() {
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Mp3), "mp3");
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Flac), "flac");
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Vorbis), "ogg");
        assert_eq!(FormatDetector::codec_extension(&AudioCodec::Wav), "wav");
    }

    #[test]
    fn test_codec_mime_type() {
        assert_eq!(FormatDetector::codec_mime_type(&AudioCodec::Mp3), "audio/mpeg");
        assert_eq!(FormatDetector::codec_mime_type(&AudioCodec::Wav), "audio/wav");
    }

    #[test]
    fn test_codec_validation() {
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Mp3).is_ok());
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Wav).is_ok());
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Opus).is_err());
        assert!(FormatDetector::validate_codec_support(&AudioCodec::Unknown).is_err());
        assert!(
            FormatDetector::validate_codec_support(&AudioCodec::Other("custom".to_string()))
                .is_err()
        );
    }
}
