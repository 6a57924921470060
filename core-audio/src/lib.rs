//! # Audio Processing Module
//!
//! Sample buffers, decoding, waveform peaks, edits and WAV encoding.
//!
//! ## Overview
//!
//! This module handles:
//! - Decoding file, in-memory and remote sources into a [`SampleBuffer`]
//! - Reducing a buffer to [`WaveformPeaks`] for display
//! - Destructive edits ([`trim`], [`add_silence`])
//! - Encoding buffers back to 16-bit PCM WAV
//!
//! Everything except decoding is synchronous and pure.

pub mod buffer;
pub mod decoder;
pub mod edit;
pub mod error;
pub mod traits;
pub mod wav;
pub mod waveform;

pub use buffer::SampleBuffer;
pub use decoder::{FormatDetector, SampleConverter, SymphoniaDecoder};
pub use edit::{add_silence, add_silence_limited, trim, SilencePosition};
pub use error::{AudioError, Result};
pub use traits::{AudioCodec, AudioDecoder, AudioSource};
pub use wav::{WavEncoder, WAV_HEADER_LEN};
pub use waveform::{display_scale, WaveformDownsampler, WaveformPeaks, DEFAULT_PEAK_HEADROOM};
