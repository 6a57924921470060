//! # Core Playback Traits
//!
//! The controller owns the cursor; actual sound output is optional and
//! delegated to a host [`PlaybackAdapter`]. Hosts without an output device
//! (tests, headless previews) run the controller alone.
//!
//! ## Command Sequence
//!
//! ```text
//! load(media) → start(position) ⇄ stop() → ... → unload()
//! ```
//!
//! `start` may be sent again without an intervening `stop` when the user
//! seeks during playback; the adapter should restart from the new position.

use crate::error::Result;
use bytes::Bytes;

/// Encoded audio primed for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackMedia {
    /// Complete WAV file.
    pub wav: Bytes,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PlaybackMedia {
    pub fn new(wav: Bytes, duration_secs: f64, sample_rate: u32, channels: u16) -> Self {
        Self {
            wav,
            duration_secs,
            sample_rate,
            channels,
        }
    }
}

/// Host audio output.
///
/// Calls come from the thread driving the controller and must return
/// promptly; implementations hand work to their own audio thread.
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackAdapter: Send + Sync {
    /// Replace the media the device will play.
    fn load(&self, media: &PlaybackMedia) -> Result<()>;

    /// Start (or restart) output at `position_secs`.
    fn start(&self, position_secs: f64) -> Result<()>;

    /// Stop output, keeping media loaded.
    fn stop(&self) -> Result<()>;

    /// Drop loaded media.
    fn unload(&self) -> Result<()>;
}
