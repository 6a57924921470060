//! # WAV Encoder
//!
//! Writes a [`SampleBuffer`] as canonical 16-bit PCM WAV.
//!
//! ## Layout
//!
//! ```text
//! offset  size  field
//! 0       4     "RIFF"
//! 4       4     36 + data size
//! 8       4     "WAVE"
//! 12      4     "fmt "
//! 16      4     16
//! 20      2     1 (PCM)
//! 22      2     channels
//! 24      4     sample rate
//! 28      4     byte rate (rate * channels * 2)
//! 32      2     block align (channels * 2)
//! 34      2     16
//! 36      4     "data"
//! 40      4     data size
//! 44      ...   interleaved little-endian i16 samples
//! ```
//!
//! Output is deterministic: the same buffer always gives the same bytes.

use crate::buffer::SampleBuffer;
use crate::error::{AudioError, Result};
use bridge_traits::EncodedAudio;
use bytes::{BufMut, Bytes, BytesMut};

pub const WAV_HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;

/// Canonical PCM WAV writer.
pub struct WavEncoder;

impl WavEncoder {
    /// Encode `buffer` into WAV bytes.
    ///
    /// # Errors
    ///
    /// `EncodeError` when the channel count does not fit the header or the
    /// data chunk would exceed the 32-bit RIFF size field.
    pub fn encode(buffer: &SampleBuffer) -> Result<Bytes> {
        let channels = u16::try_from(buffer.channel_count()).map_err(|_| {
            AudioError::EncodeError(format!("{} channels do not fit a WAV header", buffer.channel_count()))
        })?;
        let block_align = channels
            .checked_mul(BYTES_PER_SAMPLE)
            .ok_or_else(|| AudioError::EncodeError("block align overflow".to_string()))?;

        let data_len = (buffer.frame_count() as u64) * block_align as u64;
        let riff_len = data_len + 36;
        if riff_len > u32::MAX as u64 {
            return Err(AudioError::EncodeError(format!(
                "{} bytes of sample data exceed the WAV size limit",
                data_len
            )));
        }
        let byte_rate = (buffer.sample_rate() as u64) * block_align as u64;
        let byte_rate = u32::try_from(byte_rate)
            .map_err(|_| AudioError::EncodeError("byte rate overflow".to_string()))?;

        let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + data_len as usize);

        out.put_slice(b"RIFF");
        out.put_u32_le(riff_len as u32);
        out.put_slice(b"WAVE");

        out.put_slice(b"fmt ");
        out.put_u32_le(16);
        out.put_u16_le(1);
        out.put_u16_le(channels);
        out.put_u32_le(buffer.sample_rate());
        out.put_u32_le(byte_rate);
        out.put_u16_le(block_align);
        out.put_u16_le(BITS_PER_SAMPLE);

        out.put_slice(b"data");
        out.put_u32_le(data_len as u32);

        let planes: Vec<&[f32]> = buffer.channels().collect();
        for frame in 0..buffer.frame_count() {
            for plane in &planes {
                out.put_i16_le(Self::quantize(plane[frame]));
            }
        }

        Ok(out.freeze())
    }

    /// Encode and wrap with the metadata sinks need.
    pub fn encode_audio(buffer: &SampleBuffer) -> Result<EncodedAudio> {
        let data = Self::encode(buffer)?;
        Ok(EncodedAudio::wav(
            data,
            buffer.sample_rate(),
            buffer.channel_count() as u16,
            buffer.frame_count() as u64,
        ))
    }

    /// `round(clamp(sample, -1, 1) * 32767)`; NaN becomes 0.
    pub fn quantize(sample: f32) -> i16 {
        if sample.is_nan() {
            return 0;
        }
        (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
    }
}
