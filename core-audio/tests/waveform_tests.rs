//! Integration tests for waveform downsampling

use core_audio::{display_scale, SampleBuffer, WaveformDownsampler, DEFAULT_PEAK_HEADROOM};

#[test]
fn test_hundred_buckets_over_sixteen_thousand_frames() {
    // Each 160-frame window carries its bucket index as amplitude
    let samples: Vec<f32> = (0..16000).map(|i| (i / 160) as f32 / 100.0).collect();
    let buffer = SampleBuffer::new(vec![samples], 8000).unwrap();

    let peaks = WaveformDownsampler::downsample(&buffer, 100);

    assert_eq!(peaks.len(), 100);
    for (bucket, &peak) in peaks.peaks().iter().enumerate() {
        assert_eq!(peak, bucket as f32 / 100.0);
    }
}

#[test]
fn test_bucket_count_is_exact_for_any_length() {
    for &frames in &[0usize, 1, 7, 99, 100, 101, 799, 800, 801, 12345] {
        let buffer = SampleBuffer::new(vec![vec![0.25; frames]], 8000).unwrap();
        for &buckets in &[1usize, 3, 100, 800] {
            let peaks = WaveformDownsampler::downsample(&buffer, buckets);
            assert_eq!(peaks.len(), buckets, "{} frames, {} buckets", frames, buckets);
        }
    }
}

#[test]
fn test_every_frame_contributes() {
    // 801 frames into 800 buckets: the lone loud frame sits in the remainder
    let mut samples = vec![0.0; 801];
    samples[800] = 1.0;
    let buffer = SampleBuffer::new(vec![samples], 8000).unwrap();

    let peaks = WaveformDownsampler::downsample(&buffer, 800);

    assert_eq!(peaks.peaks()[799], 1.0);
    assert_eq!(peaks.max_peak(), 1.0);
}

#[test]
fn test_silent_clip_scale_is_one() {
    let buffer = SampleBuffer::silent(2, 4000, 8000).unwrap();
    let peaks = WaveformDownsampler::downsample(&buffer, 50);

    assert_eq!(peaks.max_peak(), 0.0);
    assert_eq!(peaks.display_scale(DEFAULT_PEAK_HEADROOM), 1.0);
    assert!(peaks.normalized(DEFAULT_PEAK_HEADROOM).iter().all(|&p| p == 0.0));
}

#[test]
fn test_loudest_bucket_fills_two_thirds() {
    let buffer = SampleBuffer::new(vec![vec![0.1, -0.4, 0.2, 0.0]], 8000).unwrap();
    let peaks = WaveformDownsampler::downsample(&buffer, 4);

    let scale = display_scale(peaks.max_peak(), DEFAULT_PEAK_HEADROOM);
    assert!((scale - 0.6).abs() < 1e-6);

    let normalized = peaks.normalized(DEFAULT_PEAK_HEADROOM);
    assert!((normalized[1] - 2.0 / 3.0).abs() < 1e-6);
}
