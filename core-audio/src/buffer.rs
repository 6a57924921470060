//! # Sample Buffer
//!
//! Decoded PCM audio: one normalized `f32` array per channel plus a sample rate.
//!
//! Buffers are immutable. Channel arrays are reference counted, so cloning a
//! buffer (for example to keep the first decode around for undo) never copies
//! samples, and every edit produces a buffer with fresh storage.

use crate::error::{AudioError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Decoded audio clip.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Arc<[f32]>>,
    sample_rate: u32,
    frame_count: usize,
}

impl SampleBuffer {
    /// Build a buffer from owned per-channel samples.
    ///
    /// # Errors
    ///
    /// `InvalidBuffer` when there are no channels, channel lengths differ, or
    /// the sample rate is zero.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        Self::from_shared(channels.into_iter().map(Arc::from).collect(), sample_rate)
    }

    /// Build a buffer from already shared channel arrays.
    pub fn from_shared(channels: Vec<Arc<[f32]>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer(
                "sample rate must be greater than 0".to_string(),
            ));
        }

        let frame_count = match channels.first() {
            Some(first) => first.len(),
            None => {
                return Err(AudioError::InvalidBuffer(
                    "at least one channel is required".to_string(),
                ))
            }
        };

        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, channel)| channel.len() != frame_count)
        {
            return Err(AudioError::InvalidBuffer(format!(
                "channel {} has {} frames, expected {}",
                index,
                channel.len(),
                frame_count
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
            frame_count,
        })
    }

    /// Build a buffer from interleaved samples (`LRLR...`).
    pub fn from_interleaved(samples: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        let channel_count = channels as usize;
        if channel_count == 0 {
            return Err(AudioError::InvalidBuffer(
                "at least one channel is required".to_string(),
            ));
        }
        if samples.len() % channel_count != 0 {
            return Err(AudioError::InvalidBuffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channel_count
            )));
        }

        let frames = samples.len() / channel_count;
        let mut planes = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (plane, &sample) in planes.iter_mut().zip(frame) {
                plane.push(sample);
            }
        }

        Self::new(planes, sample_rate)
    }

    /// All-zero buffer.
    pub fn silent(channels: u16, frames: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![vec![0.0; frames]; channels as usize], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// `frame_count / sample_rate`
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.sample_rate as f64
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|channel| &**channel)
    }

    /// Iterate over channel slices.
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.channels.iter().map(|channel| &**channel)
    }

    /// Number of frames closest to `secs` at this buffer's rate.
    pub fn frames_for_secs(&self, secs: f64) -> f64 {
        (secs * self.sample_rate as f64).round()
    }

    /// Interleaved copy of the samples (`LRLR...`).
    pub fn interleaved(&self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.frame_count * self.channels.len());
        for frame in 0..self.frame_count {
            for channel in &self.channels {
                samples.push(channel[frame]);
            }
        }
        samples
    }

    /// Returns `true` if both buffers point at the same channel storage.
    pub fn shares_storage_with(&self, other: &SampleBuffer) -> bool {
        self.channels.len() == other.channels.len()
            && self
                .channels
                .iter()
                .zip(&other.channels)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}
