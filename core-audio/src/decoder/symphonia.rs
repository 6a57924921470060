//! # Symphonia Decoder Implementation
//!
//! Decodes a whole clip into a [`SampleBuffer`] using the Symphonia library.

use crate::buffer::SampleBuffer;
use crate::decoder::format_detector::FormatDetector;
use crate::decoder::sample_converter::SampleConverter;
use crate::error::{AudioError, Result};
use crate::traits::{AudioCodec, AudioDecoder, AudioSource};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, RetryPolicy};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, error, info, instrument, warn};

/// Default upper bound on decoded frames (30 minutes at 48 kHz).
pub const DEFAULT_MAX_FRAMES: u64 = 86_400_000;

/// Default timeout for remote fetches.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_CONSECUTIVE_ERRORS: usize = 10;

/// Decoder for every container and codec Symphonia was built with.
///
/// Remote sources are downloaded in full through the injected
/// [`HttpClient`]; decoding itself runs on the blocking thread pool so the
/// async runtime stays responsive while long clips are processed.
#[derive(Clone)]
pub struct SymphoniaDecoder {
    http_client: Option<Arc<dyn HttpClient>>,
    max_frames: u64,
    http_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for SymphoniaDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymphoniaDecoder")
            .field("http_client", &self.http_client.is_some())
            .field("max_frames", &self.max_frames)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymphoniaDecoder {
    /// Decoder without network access.
    pub fn new() -> Self {
        Self {
            http_client: None,
            max_frames: DEFAULT_MAX_FRAMES,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Enable remote sources.
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Load the encoded bytes for `source` along with a probe hint.
    async fn fetch(&self, source: AudioSource) -> Result<(Bytes, Hint)> {
        match source {
            AudioSource::LocalFile { path } => Self::read_local_file(path).await,
            AudioSource::Remote { url, headers } => self.download(url, headers).await,
            AudioSource::InMemory { data, codec_hint } => {
                let mut hint = Hint::new();
                if let Some(codec) = codec_hint {
                    hint.with_extension(FormatDetector::codec_extension(&codec));
                }
                Ok((data, hint))
            }
        }
    }

    async fn read_local_file(path: PathBuf) -> Result<(Bytes, Hint)> {
        let data = tokio::fs::read(&path).await.map_err(|e| {
            error!("Failed to read audio file: {}", e);
            AudioError::SourceError(format!("Failed to read file: {}", e))
        })?;

        let hint = FormatDetector::hint_from_path(&path);
        Ok((Bytes::from(data), hint))
    }

    /// Download the whole resource into memory.
    async fn download(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<(Bytes, Hint)> {
        let client = self.http_client.as_ref().ok_or_else(|| {
            AudioError::SourceUnavailable("no HTTP client configured for remote sources".to_string())
        })?;

        let request = HttpRequest::get(url.as_str())
            .headers(&headers)
            .timeout(self.http_timeout);

        let response = client
            .execute_with_retry(request, self.retry_policy.clone())
            .await
            .map_err(|e| {
                error!("HTTP request failed: {}", e);
                AudioError::SourceUnavailable(format!("HTTP request failed: {}", e))
            })?;

        if !response.is_success() {
            error!(status = response.status, "HTTP request returned error status");
            return Err(AudioError::SourceUnavailable(format!(
                "HTTP error: {}",
                response.status
            )));
        }

        info!(bytes = response.body.len(), "Downloaded audio source");

        let hint = FormatDetector::hint_from_url(&url, response.content_type());
        Ok((response.body, hint))
    }

    /// Decode encoded bytes synchronously.
    ///
    /// This is the CPU-bound half of [`AudioDecoder::decode`], exposed for
    /// callers that already run on a blocking thread.
    pub fn decode_bytes(data: Bytes, hint: Hint, max_frames: u64) -> Result<SampleBuffer> {
        let media_source = Box::new(Cursor::new(data)) as Box<dyn MediaSource>;
        let mss = MediaSourceStream::new(media_source, Default::default());

        let probe_result = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                error!("Format probe failed: {}", e);
                AudioError::InvalidFormat(format!("Failed to probe format: {}", e))
            })?;

        let mut format_reader = probe_result.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                error!("No supported audio tracks found");
                AudioError::FormatNotDecodable("No supported audio tracks".to_string())
            })?;

        let track_id = track.id;
        let codec: AudioCodec = FormatDetector::detect_codec(track.codec_params.codec);
        FormatDetector::validate_codec_support(&codec)?;
        debug!(track_id, ?codec, "Selected audio track");

        if let Some(frames) = track.codec_params.n_frames {
            if frames > max_frames {
                warn!(frames, limit = max_frames, "Audio exceeds frame limit");
                return Err(AudioError::TooLong {
                    frames,
                    limit: max_frames,
                });
            }
        }

        let mut sample_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                AudioError::DecoderError(format!("Failed to create codec decoder: {}", e))
            })?;

        let mut planes: Vec<Vec<f32>> = Vec::new();
        let mut consecutive_errors = 0;

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Decoder reset required for track list change");
                    return Err(AudioError::DecoderError(
                        "Track list changed, reset required".to_string(),
                    ));
                }
                Err(SymphoniaError::IoError(e)) => {
                    consecutive_errors += 1;
                    warn!(
                        "I/O error reading packet (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, e
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(AudioError::SourceError(format!(
                            "Stream I/O failure after {} attempts: {}",
                            MAX_CONSECUTIVE_ERRORS, e
                        )));
                    }
                    continue;
                }
                Err(e) => {
                    error!("Fatal format reader error: {}", e);
                    return Err(AudioError::DecodingError(format!(
                        "Failed to read packet: {}",
                        e
                    )));
                }
            };

            while !format_reader.metadata().is_latest() {
                format_reader.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    consecutive_errors = 0;

                    if planes.is_empty() {
                        let channels = decoded.spec().channels.count();
                        planes = vec![Vec::new(); channels];
                        sample_rate = sample_rate.or(Some(decoded.spec().rate));
                    }

                    SampleConverter::append_planar(&decoded, &mut planes)?;

                    let frames = planes.first().map(|p| p.len()).unwrap_or(0) as u64;
                    if frames > max_frames {
                        warn!(frames, limit = max_frames, "Audio exceeds frame limit");
                        return Err(AudioError::TooLong {
                            frames,
                            limit: max_frames,
                        });
                    }
                }
                Err(SymphoniaError::IoError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping corrupted packet (I/O error, attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, err
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(AudioError::CorruptedStream(format!(
                            "Stream corruption after {} failed packets",
                            MAX_CONSECUTIVE_ERRORS
                        )));
                    }
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    consecutive_errors += 1;
                    warn!(
                        "Skipping packet with decode error (attempt {}/{}): {}",
                        consecutive_errors, MAX_CONSECUTIVE_ERRORS, err
                    );
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(AudioError::CorruptedStream(format!(
                            "Decoder failure after {} failed packets: {}",
                            MAX_CONSECUTIVE_ERRORS, err
                        )));
                    }
                }
                Err(e) => {
                    error!("Fatal decode error: {}", e);
                    return Err(AudioError::DecoderError(format!(
                        "Failed to decode packet: {}",
                        e
                    )));
                }
            }
        }

        let frame_count = planes.first().map(|p| p.len()).unwrap_or(0);
        if frame_count == 0 {
            return Err(AudioError::EmptyStream);
        }

        let sample_rate = sample_rate
            .ok_or_else(|| AudioError::InvalidFormat("Missing sample rate".to_string()))?;

        SampleConverter::validate_samples(planes.iter().map(|p| p.as_slice()));

        let buffer = SampleBuffer::new(planes, sample_rate)?;
        debug!(
            frames = buffer.frame_count(),
            channels = buffer.channel_count(),
            sample_rate,
            "Decoded audio buffer"
        );
        Ok(buffer)
    }
}

#[async_trait]
impl AudioDecoder for SymphoniaDecoder {
    #[instrument(skip(self, source), fields(source = %source.describe()))]
    async fn decode(&self, source: AudioSource) -> Result<SampleBuffer> {
        let (data, hint) = self.fetch(source).await?;
        if data.is_empty() {
            return Err(AudioError::InvalidFormat("source is empty".to_string()));
        }

        let max_frames = self.max_frames;
        let buffer = tokio::task::spawn_blocking(move || Self::decode_bytes(data, hint, max_frames))
            .await
            .map_err(|e| AudioError::Internal(format!("decode task failed: {}", e)))??;

        info!(
            duration_secs = buffer.duration_secs(),
            sample_rate = buffer.sample_rate(),
            channels = buffer.channel_count(),
            "Audio decoded"
        );
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_truncated_mp3_is_rejected() {
        let mp3_frame = vec![0xFF, 0xFB, 0x90, 0x00];
        let source = AudioSource::in_memory_with_hint(mp3_frame, AudioCodec::Mp3);

        let result = SymphoniaDecoder::new().decode(source).await;
        assert!(result.unwrap_err().is_decode_error());
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected() {
        let result = SymphoniaDecoder::new()
            .decode(AudioSource::in_memory(Vec::new()))
            .await;
        assert!(matches!(result, Err(AudioError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_remote_without_client_is_unavailable() {
        let result = SymphoniaDecoder::new()
            .decode(AudioSource::remote("https://cdn.example.com/a.wav"))
            .await;
        assert!(matches!(result, Err(AudioError::SourceUnavailable(_))));
    }

    #[test]
    fn test_builder() {
        let decoder = SymphoniaDecoder::new()
            .with_max_frames(10)
            .with_http_timeout(Duration::from_secs(5));
        assert_eq!(decoder.max_frames(), 10);
        assert_eq!(decoder.http_timeout, Duration::from_secs(5));
    }
}
