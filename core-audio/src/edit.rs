//! # Edit Operations
//!
//! Pure `SampleBuffer -> SampleBuffer` transforms. Inputs are never touched;
//! every result owns freshly allocated channel storage.

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Edge at which silence is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SilencePosition {
    Start,
    End,
}

impl SilencePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SilencePosition::Start => "start",
            SilencePosition::End => "end",
        }
    }
}

/// Crop `buffer` to the frames in `[start_secs, end_secs)`.
///
/// The result holds `round((end - start) * sample_rate)` frames starting at
/// `round(start * sample_rate)`; the start is pulled back when rounding
/// would run past the last frame.
///
/// # Errors
///
/// - `OutOfRange` unless `0 <= start < end <= duration` with finite bounds
/// - `EmptyRange` when the range rounds to zero frames
pub fn trim(buffer: &SampleBuffer, start_secs: f64, end_secs: f64) -> Result<SampleBuffer> {
    let duration = buffer.duration_secs();
    let in_bounds = start_secs.is_finite()
        && end_secs.is_finite()
        && start_secs >= 0.0
        && start_secs < end_secs
        && end_secs <= duration;
    if !in_bounds {
        return Err(AudioError::OutOfRange {
            start: start_secs,
            end: end_secs,
            duration,
        });
    }

    let total = buffer.frame_count();
    let length = (buffer.frames_for_secs(end_secs - start_secs) as usize).min(total);
    if length == 0 {
        return Err(AudioError::EmptyRange {
            start: start_secs,
            end: end_secs,
        });
    }

    let start_frame = (buffer.frames_for_secs(start_secs) as usize).min(total - length);

    let channels: Vec<Arc<[f32]>> = buffer
        .channels()
        .map(|channel| Arc::from(&channel[start_frame..start_frame + length]))
        .collect();

    debug!(
        start_frame,
        frames = length,
        "Trimmed buffer from {} frames",
        total
    );
    SampleBuffer::from_shared(channels, buffer.sample_rate())
}

/// Insert `duration_secs` of silence at `position`.
///
/// # Errors
///
/// `InvalidSilence` when the duration is not positive and finite, or rounds
/// to zero frames.
pub fn add_silence(
    buffer: &SampleBuffer,
    duration_secs: f64,
    position: SilencePosition,
) -> Result<SampleBuffer> {
    add_silence_limited(buffer, duration_secs, position, u64::MAX)
}

/// [`add_silence`] with an upper bound on the resulting frame count.
pub fn add_silence_limited(
    buffer: &SampleBuffer,
    duration_secs: f64,
    position: SilencePosition,
    max_frames: u64,
) -> Result<SampleBuffer> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(AudioError::InvalidSilence(format!(
            "duration must be a positive number of seconds, got {}",
            duration_secs
        )));
    }

    let silence = buffer.frames_for_secs(duration_secs);
    if silence < 1.0 {
        return Err(AudioError::InvalidSilence(format!(
            "{}s is shorter than one frame at {} Hz",
            duration_secs,
            buffer.sample_rate()
        )));
    }

    let total = buffer.frame_count() as f64 + silence;
    if total > max_frames as f64 {
        return Err(AudioError::EditTooLarge {
            frames: total as u64,
            limit: max_frames,
        });
    }
    let silence = silence as usize;

    let channels: Vec<Arc<[f32]>> = buffer
        .channels()
        .map(|channel| {
            let mut samples = Vec::with_capacity(channel.len() + silence);
            if position == SilencePosition::Start {
                samples.resize(silence, 0.0);
                samples.extend_from_slice(channel);
            } else {
                samples.extend_from_slice(channel);
                samples.resize(channel.len() + silence, 0.0);
            }
            Arc::from(samples)
        })
        .collect();

    debug!(
        frames = silence,
        position = position.as_str(),
        "Inserted silence"
    );
    SampleBuffer::from_shared(channels, buffer.sample_rate())
}
