//! Integration tests for SymphoniaDecoder
//!
//! This test suite verifies:
//! - decode(encode(buffer)) keeps frame count and stays within one 16-bit step
//! - In-memory, local file and remote sources
//! - Decode-kind errors for garbage, oversize and unreachable sources

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_audio::{
    AudioCodec, AudioDecoder, AudioError, AudioSource, SampleBuffer, SymphoniaDecoder, WavEncoder,
};
use core_runtime::ErrorKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const STEP: f32 = 1.0 / 32767.0;

fn voice_like(seconds: f64, sample_rate: u32, channels: usize) -> SampleBuffer {
    let frames = (seconds * sample_rate as f64).round() as usize;
    let planes = (0..channels)
        .map(|c| {
            (0..frames)
                .map(|i| {
                    let t = i as f32 / sample_rate as f32;
                    (t * 220.0 * (c as f32 + 1.0) * std::f32::consts::TAU).sin() * 0.8
                })
                .collect()
        })
        .collect();
    SampleBuffer::new(planes, sample_rate).unwrap()
}

fn assert_within_one_step(original: &SampleBuffer, decoded: &SampleBuffer) {
    assert_eq!(decoded.frame_count(), original.frame_count());
    assert_eq!(decoded.channel_count(), original.channel_count());
    assert_eq!(decoded.sample_rate(), original.sample_rate());

    for (a, b) in original.channels().zip(decoded.channels()) {
        for (frame, (&x, &y)) in a.iter().zip(b).enumerate() {
            let diff = (x.clamp(-1.0, 1.0) - y).abs();
            assert!(diff <= STEP * 1.001, "frame {}: {} vs {}", frame, x, y);
        }
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[tokio::test]
async fn test_in_memory_round_trip() {
    let original = voice_like(0.5, 8000, 1);
    let wav = WavEncoder::encode(&original).unwrap();

    let decoded = SymphoniaDecoder::new()
        .decode(AudioSource::in_memory_with_hint(wav, AudioCodec::Wav))
        .await
        .unwrap();

    assert_within_one_step(&original, &decoded);
}

#[tokio::test]
async fn test_stereo_round_trip_without_hint() {
    let original = voice_like(0.25, 44100, 2);
    let wav = WavEncoder::encode(&original).unwrap();

    let decoded = SymphoniaDecoder::new()
        .decode(AudioSource::in_memory(wav))
        .await
        .unwrap();

    assert_within_one_step(&original, &decoded);
}

#[tokio::test]
async fn test_decoding_own_output_is_stable() {
    let original = voice_like(0.2, 16000, 1);
    let decoder = SymphoniaDecoder::new();

    let first = decoder
        .decode(AudioSource::in_memory(WavEncoder::encode(&original).unwrap()))
        .await
        .unwrap();
    let second = decoder
        .decode(AudioSource::in_memory(WavEncoder::encode(&first).unwrap()))
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_local_file_round_trip() {
    let original = voice_like(0.3, 22050, 1);
    let path = std::env::temp_dir().join(format!("voicecut-take-{}.wav", std::process::id()));
    std::fs::write(&path, WavEncoder::encode(&original).unwrap()).unwrap();

    let decoded = SymphoniaDecoder::new()
        .decode(AudioSource::local_file(&path))
        .await
        .unwrap();

    std::fs::remove_file(&path).ok();
    assert_within_one_step(&original, &decoded);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_garbage_is_decode_error() {
    let garbage = b"this is a text file, not a recording. ".repeat(100);

    let err = SymphoniaDecoder::new()
        .decode(AudioSource::in_memory(garbage))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_missing_file_is_source_error() {
    let err = SymphoniaDecoder::new()
        .decode(AudioSource::local_file("/definitely/not/here/take.wav"))
        .await
        .unwrap_err();

    assert!(err.is_source_error());
    assert!(err.is_decode_error());
}

#[tokio::test]
async fn test_frame_limit_rejects_long_clip() {
    let original = voice_like(1.0, 8000, 1);
    let wav = WavEncoder::encode(&original).unwrap();

    let err = SymphoniaDecoder::new()
        .with_max_frames(4000)
        .decode(AudioSource::in_memory(wav))
        .await
        .unwrap_err();

    assert!(matches!(err, AudioError::TooLong { limit: 4000, .. }));
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_header_only_wav_is_rejected() {
    let empty = SampleBuffer::silent(1, 0, 8000).unwrap();
    let wav = WavEncoder::encode(&empty).unwrap();

    let err = SymphoniaDecoder::new()
        .decode(AudioSource::in_memory(wav))
        .await
        .unwrap_err();

    assert!(err.is_decode_error());
}

// ============================================================================
// Remote sources
// ============================================================================

/// Request URLs and sorted headers seen by the fake client.
#[derive(Default)]
struct RequestLog {
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

struct FakeHttpClient {
    status: u16,
    body: Bytes,
    content_type: Option<&'static str>,
    log: Arc<RequestLog>,
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let mut headers: Vec<(String, String)> = request.headers.clone().into_iter().collect();
        headers.sort();
        self.log
            .requests
            .lock()
            .map_err(|_| BridgeError::OperationFailed("poisoned".into()))?
            .push((request.url.clone(), headers));

        let mut response_headers = HashMap::new();
        if let Some(content_type) = self.content_type {
            response_headers.insert("Content-Type".to_string(), content_type.to_string());
        }
        Ok(HttpResponse {
            status: self.status,
            headers: response_headers,
            body: self.body.clone(),
        })
    }
}

#[tokio::test]
async fn test_remote_source_uses_http_client() {
    let original = voice_like(0.25, 8000, 1);
    let log = Arc::new(RequestLog::default());
    let client = FakeHttpClient {
        status: 200,
        body: WavEncoder::encode(&original).unwrap(),
        content_type: Some("audio/wav"),
        log: log.clone(),
    };

    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), "Bearer t".to_string());

    let decoded = SymphoniaDecoder::new()
        .with_http_client(Arc::new(client))
        .decode(AudioSource::remote_with_headers(
            "https://cdn.example.com/vo/stream?sig=1",
            headers,
        ))
        .await
        .unwrap();

    assert_within_one_step(&original, &decoded);

    let requests = log.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "https://cdn.example.com/vo/stream?sig=1");
    assert_eq!(
        requests[0].1,
        vec![("Authorization".to_string(), "Bearer t".to_string())]
    );
}

#[tokio::test]
async fn test_remote_http_error_is_unavailable() {
    let client = FakeHttpClient {
        status: 404,
        body: Bytes::new(),
        content_type: None,
        log: Arc::new(RequestLog::default()),
    };

    let err = SymphoniaDecoder::new()
        .with_http_client(Arc::new(client))
        .decode(AudioSource::remote("https://cdn.example.com/vo/missing.mp3"))
        .await
        .unwrap_err();

    assert!(matches!(err, AudioError::SourceUnavailable(_)));
    assert_eq!(err.kind(), ErrorKind::Decode);
}
