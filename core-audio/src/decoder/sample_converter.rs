//! # Sample Format Converter
//!
//! Normalizes Symphonia output of any sample type to planar `f32`.

use crate::error::{AudioError, Result};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::conv::IntoSample;
use symphonia::core::sample::Sample;
use tracing::warn;

/// Appends decoded packets to per-channel `f32` planes.
pub struct SampleConverter;

impl SampleConverter {
    /// Append one decoded packet to `planes`.
    ///
    /// `planes` must hold exactly one vector per decoded channel. 16-bit input
    /// is scaled by `1/32767` (floored at `-1.0`) so that decoding a WAV this
    /// engine wrote gives back the original quantized value.
    pub fn append_planar(buffer: &AudioBufferRef<'_>, planes: &mut [Vec<f32>]) -> Result<()> {
        let channels = buffer.spec().channels.count();
        if channels != planes.len() {
            return Err(AudioError::DecodingError(format!(
                "packet has {} channels, stream has {}",
                channels,
                planes.len()
            )));
        }

        match buffer {
            AudioBufferRef::F32(buf) => Self::append_converted(&**buf, planes, |sample: f32| sample),
            AudioBufferRef::F64(buf) => {
                Self::append_converted(&**buf, planes, |sample: f64| sample.into_sample())
            }
            AudioBufferRef::S32(buf) => {
                Self::append_converted(&**buf, planes, |sample: i32| sample.into_sample())
            }
            AudioBufferRef::S16(buf) => Self::append_converted(&**buf, planes, Self::s16_to_f32),
            AudioBufferRef::S24(buf) => {
                Self::append_converted(&**buf, planes, |sample| IntoSample::into_sample(sample))
            }
            AudioBufferRef::S8(buf) => {
                Self::append_converted(&**buf, planes, |sample: i8| sample.into_sample())
            }
            AudioBufferRef::U32(buf) => {
                Self::append_converted(&**buf, planes, |sample: u32| sample.into_sample())
            }
            AudioBufferRef::U16(buf) => {
                Self::append_converted(&**buf, planes, |sample: u16| sample.into_sample())
            }
            AudioBufferRef::U24(buf) => {
                Self::append_converted(&**buf, planes, |sample| IntoSample::into_sample(sample))
            }
            AudioBufferRef::U8(buf) => {
                Self::append_converted(&**buf, planes, |sample: u8| sample.into_sample())
            }
        }

        Ok(())
    }

    /// Inverse of the WAV encoder's `round(x * 32767)`.
    pub fn s16_to_f32(sample: i16) -> f32 {
        (sample as f32 / 32767.0).max(-1.0)
    }

    fn append_converted<T>(buf: &AudioBuffer<T>, planes: &mut [Vec<f32>], convert: fn(T) -> f32)
    where
        T: Sample + Copy,
    {
        for (index, plane) in planes.iter_mut().enumerate() {
            plane.extend(buf.chan(index).iter().map(|&sample| convert(sample)));
        }
    }

    /// Count samples outside `[-1.0, 1.0]`, warning when any are found.
    pub fn validate_samples<'a>(planes: impl IntoIterator<Item = &'a [f32]>) -> usize {
        let mut total = 0usize;
        let mut clipped = 0usize;
        for plane in planes {
            total += plane.len();
            clipped += plane.iter().filter(|&&s| !(-1.0..=1.0).contains(&s)).count();
        }

        if clipped > 0 {
            warn!(
                "Detected {} clipped samples ({:.2}% of total)",
                clipped,
                (clipped as f64 / total as f64) * 100.0
            );
        }

        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::audio::{AudioBuffer, Channels, SignalSpec};

    fn stereo_spec() -> SignalSpec {
        SignalSpec::new(8000, Channels::FRONT_LEFT | Channels::FRONT_RIGHT)
    }

    #[test]
    fn test_s16_scaling_matches_encoder() {
        assert_eq!(SampleConverter::s16_to_f32(32767), 1.0);
        assert_eq!(SampleConverter::s16_to_f32(0), 0.0);
        assert_eq!(SampleConverter::s16_to_f32(-32768), -1.0);
        assert!((SampleConverter::s16_to_f32(16384) - 16384.0 / 32767.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_append_planar_s16() {
        let mut buf = AudioBuffer::<i16>::new(4, stereo_spec());
        buf.render_reserved(Some(2));
        buf.chan_mut(0).copy_from_slice(&[32767, 0]);
        buf.chan_mut(1).copy_from_slice(&[-32768, 16384]);

        let mut planes = vec![Vec::new(), Vec::new()];
        SampleConverter::append_planar(&AudioBufferRef::S16(std::borrow::Cow::Borrowed(&buf)), &mut planes)
            .unwrap();

        assert_eq!(planes[0], vec![1.0, 0.0]);
        assert_eq!(planes[1][0], -1.0);
        assert_eq!(planes[1].len(), 2);
    }

    #[test]
    fn test_append_planar_channel_mismatch() {
        let mut buf = AudioBuffer::<f32>::new(4, stereo_spec());
        buf.render_reserved(Some(1));

        let mut planes = vec![Vec::new()];
        let result = SampleConverter::append_planar(
            &AudioBufferRef::F32(std::borrow::Cow::Borrowed(&buf)),
            &mut planes,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_samples_with_clipping() {
        let left = [0.0, 1.5, 0.5];
        let right = [-1.5, 1.0, -1.0];
        assert_eq!(
            SampleConverter::validate_samples([&left[..], &right[..]]),
            2
        );
        assert_eq!(SampleConverter::validate_samples([&[0.0f32, 0.25][..]]), 0);
    }
}
