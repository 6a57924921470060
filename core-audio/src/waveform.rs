//! # Waveform Downsampling
//!
//! Reduces a [`SampleBuffer`] to a fixed number of peak magnitudes for
//! drawing.
//!
//! ## Overview
//!
//! Frames are split into `bucket_count` contiguous windows and each bucket
//! holds the largest absolute sample found in its window across all
//! channels. The output length is always exactly `bucket_count`:
//!
//! - When there are at least as many frames as buckets, every window spans
//!   `frames / bucket_count` frames and the last window also absorbs the
//!   remainder, so no trailing audio is dropped.
//! - When the clip is shorter than the bucket count, bucket `i` takes the
//!   peak of frame `floor(i * frames / bucket_count)`.
//!
//! ## Display scale
//!
//! Renderers divide peaks by [`WaveformPeaks::display_scale`]
//! (`max_peak * headroom`) so the loudest bucket reaches `1 / headroom` of
//! the available height. A silent clip has a scale of `1.0`.

use crate::buffer::SampleBuffer;
use serde::{Deserialize, Serialize};

/// Default headroom: the loudest bucket fills two thirds of the height.
pub const DEFAULT_PEAK_HEADROOM: f32 = 1.5;

/// Per-bucket peak magnitudes in `[0, 1]` (larger for clipped input).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformPeaks {
    peaks: Vec<f32>,
}

impl WaveformPeaks {
    pub fn new(peaks: Vec<f32>) -> Self {
        Self { peaks }
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Largest bucket value, `0.0` when empty.
    pub fn max_peak(&self) -> f32 {
        self.peaks.iter().copied().fold(0.0, f32::max)
    }

    /// Divisor applied by renderers.
    pub fn display_scale(&self, headroom: f32) -> f32 {
        display_scale(self.max_peak(), headroom)
    }

    /// Peaks divided by [`Self::display_scale`].
    pub fn normalized(&self, headroom: f32) -> Vec<f32> {
        let scale = self.display_scale(headroom);
        self.peaks.iter().map(|peak| peak / scale).collect()
    }
}

/// `max_peak * headroom`, or `1.0` for silent or degenerate input.
pub fn display_scale(max_peak: f32, headroom: f32) -> f32 {
    let scale = max_peak * headroom;
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    }
}

/// Computes [`WaveformPeaks`] from decoded audio.
pub struct WaveformDownsampler;

impl WaveformDownsampler {
    /// Exactly `bucket_count` peaks; empty when `bucket_count` is zero.
    pub fn downsample(buffer: &SampleBuffer, bucket_count: usize) -> WaveformPeaks {
        let frames = buffer.frame_count();
        if bucket_count == 0 {
            return WaveformPeaks::default();
        }
        if frames == 0 {
            return WaveformPeaks::new(vec![0.0; bucket_count]);
        }

        let peaks = if frames >= bucket_count {
            let window = frames / bucket_count;
            (0..bucket_count)
                .map(|bucket| {
                    let start = bucket * window;
                    let end = if bucket + 1 == bucket_count {
                        frames
                    } else {
                        start + window
                    };
                    Self::window_peak(buffer, start, end)
                })
                .collect()
        } else {
            (0..bucket_count)
                .map(|bucket| {
                    let frame = bucket * frames / bucket_count;
                    Self::window_peak(buffer, frame, frame + 1)
                })
                .collect()
        };

        WaveformPeaks::new(peaks)
    }

    /// Largest `|sample|` in `start..end` over all channels. NaN is ignored.
    fn window_peak(buffer: &SampleBuffer, start: usize, end: usize) -> f32 {
        buffer
            .channels()
            .flat_map(|channel| channel[start..end].iter())
            .fold(0.0f32, |peak, sample| peak.max(sample.abs()))
    }
}
