//! # Core Audio Traits
//!
//! Source descriptions and the decoder abstraction used by the edit session.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_audio::{AudioDecoder, AudioSource, SymphoniaDecoder};
//!
//! async fn example(decoder: SymphoniaDecoder) {
//!     let buffer = decoder
//!         .decode(AudioSource::local_file("/tmp/line-7.wav"))
//!         .await
//!         .expect("decode failed");
//!     println!("{} frames at {} Hz", buffer.frame_count(), buffer.sample_rate());
//! }
//! ```

use crate::buffer::SampleBuffer;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use core_runtime::logging::{redact_source_url, strip_path};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// Audio Format Types
// ============================================================================

/// Audio codecs recognised by the format detector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MPEG-1 Audio Layer 3
    Mp3,
    /// Advanced Audio Coding (AAC/M4A)
    Aac,
    /// Free Lossless Audio Codec
    Flac,
    /// Ogg Vorbis
    Vorbis,
    /// Opus
    Opus,
    /// Waveform Audio File Format
    Wav,
    /// Apple Lossless Audio Codec
    Alac,
    /// Codec not recognized
    Unknown,
    /// Anything else the container reported
    Other(String),
}

impl AudioCodec {
    /// Returns `true` if this is a lossless codec.
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioCodec::Flac | AudioCodec::Wav | AudioCodec::Alac)
    }

    /// Returns `true` if this codec is lossy.
    pub fn is_lossy(&self) -> bool {
        matches!(
            self,
            AudioCodec::Mp3 | AudioCodec::Aac | AudioCodec::Vorbis | AudioCodec::Opus
        )
    }
}

// ============================================================================
// Audio Source
// ============================================================================

/// Where encoded audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// HTTP(S) URL, fetched through the configured `HttpClient`.
    Remote {
        url: String,
        headers: HashMap<String, String>,
    },

    /// Encoded bytes already held by the host.
    InMemory {
        data: Bytes,
        codec_hint: Option<AudioCodec>,
    },

    /// File on the local file system.
    LocalFile { path: PathBuf },
}

impl AudioSource {
    pub fn remote(url: impl Into<String>) -> Self {
        AudioSource::Remote {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Remote source with extra request headers (auth, range, ...).
    pub fn remote_with_headers(url: impl Into<String>, headers: HashMap<String, String>) -> Self {
        AudioSource::Remote {
            url: url.into(),
            headers,
        }
    }

    pub fn in_memory(data: impl Into<Bytes>) -> Self {
        AudioSource::InMemory {
            data: data.into(),
            codec_hint: None,
        }
    }

    pub fn in_memory_with_hint(data: impl Into<Bytes>, codec: AudioCodec) -> Self {
        AudioSource::InMemory {
            data: data.into(),
            codec_hint: Some(codec),
        }
    }

    pub fn local_file(path: impl Into<PathBuf>) -> Self {
        AudioSource::LocalFile { path: path.into() }
    }

    /// Log-safe description. Query strings and directories are dropped.
    pub fn describe(&self) -> String {
        match self {
            AudioSource::Remote { url, .. } => redact_source_url(url),
            AudioSource::InMemory { data, .. } => format!("memory:{} bytes", data.len()),
            AudioSource::LocalFile { path } => {
                format!("file:{}", strip_path(&path.to_string_lossy()))
            }
        }
    }
}

// ============================================================================
// Decoder Trait
// ============================================================================

/// Turns a source into a fully decoded [`SampleBuffer`].
///
/// Implementations may suspend while fetching. A decode either yields the
/// whole clip or an error; there is no partial result.
#[async_trait]
pub trait AudioDecoder: Send + Sync {
    async fn decode(&self, source: AudioSource) -> Result<SampleBuffer>;
}
