//! Integration tests for trim and silence insertion
//!
//! This test suite verifies:
//! - Frame counts for trims across rates and bounds
//! - Silence placement and the silence round trip
//! - Inputs are never modified

use core_audio::{add_silence, trim, AudioError, SampleBuffer, SilencePosition};
use core_runtime::ErrorKind;

fn sine(seconds: f64, sample_rate: u32, channels: usize) -> SampleBuffer {
    let frames = (seconds * sample_rate as f64).round() as usize;
    let plane: Vec<f32> = (0..frames)
        .map(|i| (i as f32 * 0.05).sin() * 0.7)
        .collect();
    SampleBuffer::new(vec![plane; channels], sample_rate).unwrap()
}

// ============================================================================
// Trim
// ============================================================================

#[test]
fn test_trim_two_second_clip_to_middle_second() {
    let buffer = sine(2.0, 8000, 1);
    assert_eq!(buffer.frame_count(), 16000);

    let trimmed = trim(&buffer, 0.5, 1.5).unwrap();

    assert_eq!(trimmed.frame_count(), 8000);
    assert_eq!(trimmed.duration_secs(), 1.0);
    assert_eq!(trimmed.sample_rate(), 8000);
    assert_eq!(trimmed.channel(0).unwrap(), &buffer.channel(0).unwrap()[4000..12000]);
}

#[test]
fn test_trim_frame_count_matches_rounded_length() {
    let rates = [8000u32, 22050, 44100, 48000];
    let bounds = [(0.0, 0.1), (0.123, 0.987), (0.5, 2.0), (1.9999, 2.0), (0.0, 2.0)];

    for &rate in &rates {
        let buffer = sine(2.0, rate, 2);
        for &(start, end) in &bounds {
            let trimmed = trim(&buffer, start, end).unwrap();
            let expected = ((end - start) * rate as f64).round() as usize;
            assert_eq!(
                trimmed.frame_count(),
                expected,
                "rate {} bounds {}..{}",
                rate,
                start,
                end
            );
            assert_eq!(trimmed.channel_count(), 2);
        }
    }
}

#[test]
fn test_trim_whole_clip_is_equal_but_not_shared() {
    let buffer = sine(1.0, 8000, 2);
    let trimmed = trim(&buffer, 0.0, buffer.duration_secs()).unwrap();

    assert_eq!(trimmed, buffer);
    assert!(!trimmed.shares_storage_with(&buffer));
}

#[test]
fn test_trim_out_of_range_is_range_kind() {
    let buffer = sine(1.0, 8000, 1);
    let err = trim(&buffer, 0.5, 1.5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn test_trim_leaves_input_untouched() {
    let buffer = sine(1.0, 8000, 1);
    let before = buffer.clone();
    let _ = trim(&buffer, 0.1, 0.2).unwrap();
    assert_eq!(buffer, before);
    assert!(buffer.shares_storage_with(&before));
}

// ============================================================================
// Silence
// ============================================================================

#[test]
fn test_add_quarter_second_silence_at_end() {
    let buffer = sine(1.0, 8000, 1);
    let padded = add_silence(&buffer, 0.25, SilencePosition::End).unwrap();

    assert_eq!(padded.frame_count(), 10000);
    assert_eq!(padded.duration_secs(), 1.25);

    let samples = padded.channel(0).unwrap();
    assert_eq!(&samples[..8000], buffer.channel(0).unwrap());
    assert!(samples[8000..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_silence_at_start_trims_back_to_zeros() {
    for &d in &[0.01, 0.25, 0.5, 1.0] {
        let buffer = sine(1.0, 8000, 2);
        let padded = add_silence(&buffer, d, SilencePosition::Start).unwrap();
        let head = trim(&padded, 0.0, d).unwrap();

        assert_eq!(head.frame_count(), (d * 8000.0).round() as usize);
        assert!((head.duration_secs() - d).abs() < 1.0 / 8000.0);
        for channel in head.channels() {
            assert!(channel.iter().all(|&s| s == 0.0), "silence of {}s", d);
        }
    }
}

#[test]
fn test_silence_is_applied_to_every_channel() {
    let buffer = sine(0.5, 8000, 3);
    let padded = add_silence(&buffer, 0.125, SilencePosition::Start).unwrap();

    assert_eq!(padded.channel_count(), 3);
    for channel in padded.channels() {
        assert_eq!(channel.len(), 5000);
        assert!(channel[..1000].iter().all(|&s| s == 0.0));
    }
}

#[test]
fn test_non_positive_silence_is_validation_kind() {
    let buffer = sine(0.5, 8000, 1);
    let err = add_silence(&buffer, 0.0, SilencePosition::End).unwrap_err();
    assert!(matches!(err, AudioError::InvalidSilence(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
}
