//! # Engine Configuration Module
//!
//! Provides configuration management for the editing core.
//!
//! ## Overview
//!
//! Configuration is split in two:
//! - [`EditorSettings`]: plain tunables (bucket count, drag threshold, progress
//!   cadence, size guards). Serializable so hosts can ship them as JSON.
//! - [`EngineConfig`]: settings plus the host bridges the core needs. Built
//!   through [`EngineConfigBuilder`], which fails fast when a required bridge
//!   is missing.
//!
//! ## Required Dependencies
//!
//! - `EditedAudioSink` - Receives the encoded WAV of every accepted edit
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Fetches remote sources (desktop default: reqwest)
//! - `Clock` - Monotonic time for the playback cursor (default: `SystemClock`)
//!
//! When the `desktop-shims` feature is enabled, a `FileExportSink` writing to
//! the user's download directory and a `ReqwestHttpClient` are injected if not
//! provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{EditorSettings, EngineConfig};
//! use std::sync::Arc;
//!
//! let settings = EditorSettings::from_json(r#"{ "waveform_buckets": 1200 }"#)?;
//! let config = EngineConfig::builder()
//!     .settings(settings)
//!     .sink(Arc::new(MySink))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, EditedAudioSink, HttpClient, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Editor Settings
// ============================================================================

/// Tunables for decoding, waveform rendering, gestures and playback.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Number of waveform buckets produced for display
    #[serde(default = "default_waveform_buckets")]
    pub waveform_buckets: usize,

    /// Display scale multiplier applied to the loudest peak
    #[serde(default = "default_peak_headroom")]
    pub peak_headroom: f32,

    /// Drags narrower than this (in percent of the clip) become seeks
    #[serde(default = "default_min_drag_percent")]
    pub min_drag_percent: f64,

    /// Progress push cadence while playing (milliseconds)
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Largest number of frames a decode or edit may produce
    #[serde(default = "default_max_decoded_frames")]
    pub max_decoded_frames: u64,

    /// Timeout for fetching remote sources (seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Event bus channel capacity
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

fn default_waveform_buckets() -> usize {
    800
}

fn default_peak_headroom() -> f32 {
    1.5
}

fn default_min_drag_percent() -> f64 {
    0.5
}

fn default_progress_interval_ms() -> u64 {
    16
}

fn default_max_decoded_frames() -> u64 {
    // 30 minutes at 48 kHz
    48_000 * 60 * 30
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_event_buffer_size() -> usize {
    crate::events::DEFAULT_EVENT_BUFFER_SIZE
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            waveform_buckets: default_waveform_buckets(),
            peak_headroom: default_peak_headroom(),
            min_drag_percent: default_min_drag_percent(),
            progress_interval_ms: default_progress_interval_ms(),
            max_decoded_frames: default_max_decoded_frames(),
            http_timeout_secs: default_http_timeout_secs(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl EditorSettings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid editor settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_waveform_buckets(mut self, buckets: usize) -> Self {
        self.waveform_buckets = buckets;
        self
    }

    pub fn with_peak_headroom(mut self, headroom: f32) -> Self {
        self.peak_headroom = headroom;
        self
    }

    pub fn with_min_drag_percent(mut self, percent: f64) -> Self {
        self.min_drag_percent = percent;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_max_decoded_frames(mut self, frames: u64) -> Self {
        self.max_decoded_frames = frames;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout_secs = timeout.as_secs();
        self
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<()> {
        if self.waveform_buckets == 0 {
            return Err(Error::Config(
                "waveform_buckets must be greater than 0".to_string(),
            ));
        }

        if self.waveform_buckets > 1_000_000 {
            return Err(Error::Config(
                "waveform_buckets exceeds maximum of 1,000,000".to_string(),
            ));
        }

        if !self.peak_headroom.is_finite() || self.peak_headroom < 1.0 {
            return Err(Error::Config(
                "peak_headroom must be a finite value >= 1.0".to_string(),
            ));
        }

        if !self.min_drag_percent.is_finite() || !(0.0..=100.0).contains(&self.min_drag_percent)
        {
            return Err(Error::Config(
                "min_drag_percent must be within [0, 100]".to_string(),
            ));
        }

        if self.progress_interval_ms == 0 || self.progress_interval_ms > 1000 {
            return Err(Error::Config(
                "progress_interval_ms must be within 1..=1000".to_string(),
            ));
        }

        if self.max_decoded_frames == 0 {
            return Err(Error::Config(
                "max_decoded_frames must be greater than 0".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(Error::Config(
                "http_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Engine Configuration
// ============================================================================

/// Settings plus host bridges. Use [`EngineConfigBuilder`] to construct.
#[derive(Clone)]
pub struct EngineConfig {
    /// Fetches `Remote` sources; without one, remote loads fail as decode errors
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Monotonic clock driving the playback cursor
    pub clock: Arc<dyn Clock>,

    /// Receives edited audio (required)
    pub sink: Arc<dyn EditedAudioSink>,

    pub settings: EditorSettings,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("clock", &"Clock { ... }")
            .field("sink", &"EditedAudioSink { ... }")
            .field("settings", &self.settings)
            .finish()
    }
}

impl EngineConfig {
    /// Creates a new builder for constructing an `EngineConfig`.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn sink_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "EditedAudioSink".to_string(),
        message: "EditedAudioSink implementation is required to receive edited audio. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default FileExportSink. \
                 Mobile/Web: inject a sink that attaches the WAV to the host form or download."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_sink() -> Result<Arc<dyn EditedAudioSink>> {
    use bridge_desktop::FileExportSink;

    let sink: Arc<dyn EditedAudioSink> = Arc::new(FileExportSink::in_downloads("voicecut-edit"));
    Ok(sink)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_sink() -> Result<Arc<dyn EditedAudioSink>> {
    Err(sink_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(settings: &EditorSettings) -> Option<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(
        settings.http_timeout(),
    ));
    Some(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_settings: &EditorSettings) -> Option<Arc<dyn HttpClient>> {
    None
}

/// Builder for constructing [`EngineConfig`] instances.
#[derive(Default)]
pub struct EngineConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<dyn Clock>>,
    sink: Option<Arc<dyn EditedAudioSink>>,
    settings: Option<EditorSettings>,
}

impl EngineConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the clock. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the sink that receives edited audio (required).
    pub fn sink(mut self, sink: Arc<dyn EditedAudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets all editor settings at once.
    pub fn settings(mut self, settings: EditorSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds the final `EngineConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when no sink is available
    /// - `Config` when settings fail validation
    pub fn build(self) -> Result<EngineConfig> {
        let settings = self.settings.unwrap_or_default();

        let sink = match self.sink {
            Some(sink) => sink,
            None => provide_default_sink()?,
        };

        let http_client = self
            .http_client
            .or_else(|| provide_default_http_client(&settings));

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);

        let config = EngineConfig {
            http_client,
            clock,
            sink,
            settings,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{BridgeError, EncodedAudio, ManualClock};

    struct NullSink;

    impl EditedAudioSink for NullSink {
        fn deliver(&self, _audio: EncodedAudio) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        fn release(&self) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.waveform_buckets, 800);
        assert_eq!(settings.peak_headroom, 1.5);
        assert_eq!(settings.min_drag_percent, 0.5);
        assert_eq!(settings.progress_interval(), Duration::from_millis(16));
        assert_eq!(settings.max_decoded_frames, 86_400_000);
        assert_eq!(settings.http_timeout(), Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            EditorSettings::from_json(r#"{ "waveform_buckets": 1200, "min_drag_percent": 1.0 }"#)
                .unwrap();

        assert_eq!(settings.waveform_buckets, 1200);
        assert_eq!(settings.min_drag_percent, 1.0);
        assert_eq!(settings.peak_headroom, 1.5);
        assert_eq!(settings.progress_interval_ms, 16);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = EditorSettings::from_json(r#"{ "waveform_buckets": "many" }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = EditorSettings::from_json(r#"{ "waveform_buckets": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("waveform_buckets"));
    }

    #[test]
    fn test_validate_rejects_nonsense() {
        assert!(EditorSettings::default()
            .with_peak_headroom(0.5)
            .validate()
            .is_err());
        assert!(EditorSettings::default()
            .with_peak_headroom(f32::NAN)
            .validate()
            .is_err());
        assert!(EditorSettings::default()
            .with_min_drag_percent(150.0)
            .validate()
            .is_err());
        assert!(EditorSettings::default()
            .with_progress_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(EditorSettings::default()
            .with_max_decoded_frames(0)
            .validate()
            .is_err());
        assert!(EditorSettings::default()
            .with_http_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_builder_with_explicit_bridges() {
        let clock = ManualClock::new();
        let config = EngineConfig::builder()
            .sink(Arc::new(NullSink))
            .clock(Arc::new(clock.clone()))
            .settings(EditorSettings::default().with_waveform_buckets(64))
            .build()
            .unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(config.clock.monotonic(), Duration::from_secs(2));
        assert_eq!(config.settings.waveform_buckets, 64);
    }

    #[test]
    fn test_builder_validates_settings() {
        let result = EngineConfig::builder()
            .sink(Arc::new(NullSink))
            .settings(EditorSettings::default().with_waveform_buckets(0))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_sink() {
        let result = EngineConfig::builder().build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "EditedAudioSink");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_no_default_http_client_without_shims() {
        let config = EngineConfig::builder()
            .sink(Arc::new(NullSink))
            .build()
            .unwrap();
        assert!(config.http_client.is_none());
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_defaults() {
        let config = EngineConfig::builder().build().unwrap();
        assert!(config.http_client.is_some());
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = EngineConfig::builder()
            .sink(Arc::new(NullSink))
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("EditedAudioSink { ... }"));
        assert!(rendered.contains("waveform_buckets"));
    }
}
