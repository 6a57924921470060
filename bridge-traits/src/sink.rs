//! Edited Audio Output
//!
//! Every accepted edit produces a freshly encoded WAV binary. The core does
//! not store or upload it; it hands it to an [`EditedAudioSink`] supplied by
//! the host (attach to a form, offer as a download, write to disk).

use bytes::Bytes;

use crate::error::Result;

/// An encoded edit result handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAudio {
    /// Complete WAV file, header included
    pub data: Bytes,
    /// MIME type of `data`
    pub mime_type: &'static str,
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_count: u64,
}

impl EncodedAudio {
    pub fn wav(data: Bytes, sample_rate: u32, channels: u16, frame_count: u64) -> Self {
        Self {
            data,
            mime_type: "audio/wav",
            sample_rate,
            channels,
            frame_count,
        }
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Receiver of edited audio.
///
/// `deliver` is called once per accepted edit, after the edit has been fully
/// computed and the output device has accepted it. If it returns an error the
/// edit is not committed. `release` is called on undo; the sink should drop
/// whatever edited binary it holds.
///
/// Both calls run while the session's state lock is held, so transport verbs
/// and the progress ticker wait on them. Implementations doing slow I/O
/// (network uploads, large disk writes) should hand the work to their own
/// thread and return.
#[cfg_attr(test, mockall::automock)]
pub trait EditedAudioSink: Send + Sync {
    fn deliver(&self, audio: EncodedAudio) -> Result<()>;

    fn release(&self) -> Result<()>;
}
