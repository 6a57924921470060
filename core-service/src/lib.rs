//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host-provided bridges from an
//! [`EngineConfig`](core_runtime::EngineConfig) (HTTP client, clock, edited
//! audio sink) into editing sessions. Desktop apps typically enable the
//! `desktop-shims` feature, which supplies a reqwest HTTP client and a
//! downloads-folder sink when the host does not inject its own.
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_audio::AudioSource;
//! use core_runtime::EngineConfig;
//! use core_service::CoreService;
//!
//! let core = CoreService::new(EngineConfig::builder().build()?)?;
//! let session = core.new_session();
//! let ticker = core.spawn_progress_ticker(session.clone());
//!
//! session.load(AudioSource::remote("https://cdn.example.com/vo/take-7.mp3")).await?;
//! session.play()?;
//! # ticker.stop();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod selection;
pub mod session;

pub use error::{CoreError, Result};
pub use selection::{
    GestureOutcome, SelectionController, SelectionPhase, SelectionRange,
    DEFAULT_MIN_DRAG_PERCENT,
};
pub use session::{EditOperation, EditSession, LoadOutcome, SessionSnapshot};

use std::sync::Arc;

use core_audio::{AudioDecoder, SymphoniaDecoder};
use core_playback::{PlaybackAdapter, ProgressSource, ProgressTicker};
use core_runtime::{EngineConfig, EventBus, EventStream};
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<EngineConfig>,
    decoder: Arc<dyn AudioDecoder>,
    playback_adapter: Option<Arc<dyn PlaybackAdapter>>,
    events: EventBus,
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.config)
            .field("subscribers", &self.events.subscriber_count())
            .finish()
    }
}

impl CoreService {
    /// Create a service from a built configuration.
    ///
    /// Remote sources are fetched through the configured HTTP client with
    /// the configured timeout; decodes longer than `max_decoded_frames` fail.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let settings = &config.settings;
        let mut decoder = SymphoniaDecoder::new()
            .with_max_frames(settings.max_decoded_frames)
            .with_http_timeout(settings.http_timeout());
        if let Some(client) = &config.http_client {
            decoder = decoder.with_http_client(Arc::clone(client));
        }

        let events = EventBus::new(settings.event_buffer_size);
        info!(
            waveform_buckets = settings.waveform_buckets,
            remote_sources = config.http_client.is_some(),
            "Core service initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            decoder: Arc::new(decoder),
            playback_adapter: None,
            events,
        })
    }

    /// Replace the decoder used by new sessions.
    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Attach a host output device to new sessions.
    pub fn with_playback_adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.playback_adapter = Some(adapter);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to session, playback and selection events.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Create an empty session wired to this service's bridges.
    pub fn new_session(&self) -> Arc<EditSession> {
        let session = EditSession::new(
            Arc::clone(&self.decoder),
            Arc::clone(&self.config.sink),
            Arc::clone(&self.config.clock),
            self.config.settings.clone(),
            self.events.clone(),
        );
        let session = match &self.playback_adapter {
            Some(adapter) => session.with_playback_adapter(Arc::clone(adapter)),
            None => session,
        };
        info!(session_id = %session.id(), "Session created");
        Arc::new(session)
    }

    /// Drive `session`'s progress cadence on the current tokio runtime.
    ///
    /// Call [`ProgressTicker::stop`] on the returned handle to end it.
    pub fn spawn_progress_ticker(&self, session: Arc<EditSession>) -> ProgressTicker {
        let ticker = ProgressTicker::new(self.config.settings.progress_interval());
        let source: Arc<dyn ProgressSource> = session;
        ticker.spawn(source);
        ticker
    }
}
