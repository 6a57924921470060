//! # Audio Decoder Module
//!
//! Whole-clip decoding using the Symphonia library.
//!
//! ## Overview
//!
//! `SymphoniaDecoder` implements [`AudioDecoder`](crate::AudioDecoder). It
//! fetches the encoded bytes (file, memory or HTTP), probes the container,
//! decodes every packet of the first audio track and returns one
//! [`SampleBuffer`](crate::SampleBuffer).
//!
//! ## Supported Formats
//!
//! | Format | Codec | Notes |
//! |--------|-------|-------|
//! | MP3 | MPEG-1/2 Audio Layer III | |
//! | AAC / M4A | Advanced Audio Coding | MP4 container |
//! | FLAC | Free Lossless Audio Codec | |
//! | Vorbis | Ogg Vorbis | |
//! | WAV | PCM, A-law, mu-law | |
//! | ALAC | Apple Lossless | MP4 container |
//! | Opus | | Rejected with `UnsupportedCodec` |
//!
//! ## Pipeline
//!
//! ```text
//! AudioSource → bytes + Hint → FormatReader → Decoder → planar f32 → SampleBuffer
//! ```
//!
//! ## Limits
//!
//! Decoding stops with `TooLong` once the clip passes the configured frame
//! limit, and a source that yields no frames fails with `EmptyStream`.

mod format_detector;
mod sample_converter;
mod symphonia;

pub use self::symphonia::{SymphoniaDecoder, DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_FRAMES};
pub use format_detector::FormatDetector;
pub use sample_converter::SampleConverter;
