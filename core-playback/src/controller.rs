//! # Playback Controller
//!
//! Transport state machine driving a time cursor over primed media.
//!
//! ## States
//!
//! ```text
//! Idle ──begin_loading──▶ Loading ──prime──▶ Paused ◀──pause/end── Playing
//!                            │                  └──────play──────────▶
//!                            └──fail──▶ Error
//! any state ──begin_loading──▶ Loading
//! ```
//!
//! ## Cursor
//!
//! The cursor is an [`Anchor`]: a position and the clock reading at which
//! the cursor stood there. While playing, the current time is
//! `anchor.position + (now - anchor.clock_at)`. Seeking replaces the anchor
//! as a single value, so a concurrent progress read never sees a half-updated
//! cursor.
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::ManualClock;
//! use core_playback::{PlaybackController, PlaybackMedia, PlaybackState};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut controller = PlaybackController::new(Arc::new(clock.clone()));
//!
//! controller.begin_loading();
//! controller
//!     .prime(PlaybackMedia::new(bytes::Bytes::new(), 2.0, 8000, 1))
//!     .unwrap();
//! controller.play().unwrap();
//!
//! clock.advance(Duration::from_millis(500));
//! assert_eq!(controller.tick(), Some(25.0));
//! assert_eq!(controller.state(), PlaybackState::Playing);
//! ```

use crate::config::{PlaybackConfig, PlaybackState};
use crate::error::{PlaybackError, Result};
use crate::traits::{PlaybackAdapter, PlaybackMedia};
use bridge_traits::time::Clock;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cursor reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position_secs: f64,
    pub clock_at: Duration,
}

/// Read-only view of the transport for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub current_time_secs: f64,
    pub duration_secs: f64,
    pub progress_percent: f64,
}

/// Play/pause/seek state machine.
pub struct PlaybackController {
    state: PlaybackState,
    media: Option<PlaybackMedia>,
    anchor: Anchor,
    clock: Arc<dyn Clock>,
    config: PlaybackConfig,
    events: Option<EventBus>,
    adapter: Option<Arc<dyn PlaybackAdapter>>,
    last_error: Option<String>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("anchor", &self.anchor)
            .field("duration_secs", &self.duration_secs())
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}

impl PlaybackController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let clock_at = clock.monotonic();
        Self {
            state: PlaybackState::Idle,
            media: None,
            anchor: Anchor {
                position_secs: 0.0,
                clock_at,
            },
            clock,
            config: PlaybackConfig::default(),
            events: None,
            adapter: None,
            last_error: None,
        }
    }

    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish state changes, progress and seeks on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Mirror transport commands to a host output device.
    pub fn with_adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn media(&self) -> Option<&PlaybackMedia> {
        self.media.as_ref()
    }

    /// Message of the last failed load, cleared by the next load.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn duration_secs(&self) -> f64 {
        self.media.as_ref().map_or(0.0, |media| media.duration_secs)
    }

    /// Cursor position, clamped to `[0, duration]`.
    pub fn current_time_secs(&self) -> f64 {
        let duration = self.duration_secs();
        let position = if self.state == PlaybackState::Playing {
            let elapsed = self
                .clock
                .monotonic()
                .saturating_sub(self.anchor.clock_at)
                .as_secs_f64();
            self.anchor.position_secs + elapsed
        } else {
            self.anchor.position_secs
        };
        position.clamp(0.0, duration)
    }

    /// `current_time / duration * 100`, or `0` with nothing loaded.
    pub fn progress_percent(&self) -> f64 {
        let duration = self.duration_secs();
        if duration <= 0.0 {
            return 0.0;
        }
        self.current_time_secs() / duration * 100.0
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            current_time_secs: self.current_time_secs(),
            duration_secs: self.duration_secs(),
            progress_percent: self.progress_percent(),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Enter `Loading` from any state, dropping primed media.
    pub fn begin_loading(&mut self) {
        if self.state == PlaybackState::Playing {
            self.adapter_call("stop", |adapter| adapter.stop());
        }
        if self.media.take().is_some() {
            self.adapter_call("unload", |adapter| adapter.unload());
        }
        self.last_error = None;
        self.move_anchor(0.0);
        self.transition(PlaybackState::Loading);
    }

    /// Prime `media` and park the cursor at 0 in `Paused`.
    ///
    /// [`stage`](Self::stage) followed by [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// `AdapterError` if the host refuses the media; the controller then
    /// moves to `Error`.
    pub fn prime(&mut self, media: PlaybackMedia) -> Result<()> {
        if let Err(e) = self.stage(&media) {
            self.fail(e.to_string());
            return Err(e);
        }
        self.commit(media);
        Ok(())
    }

    /// Hand `media` to the adapter without touching transport state.
    ///
    /// Pair with [`commit`](Self::commit) once the caller's other steps
    /// succeed, or [`unstage`](Self::unstage) to give the adapter its
    /// previous media back.
    ///
    /// # Errors
    ///
    /// `AdapterError` if the host refuses the media. State, cursor and the
    /// current media are unchanged.
    pub fn stage(&self, media: &PlaybackMedia) -> Result<()> {
        match &self.adapter {
            Some(adapter) => adapter
                .load(media)
                .map_err(|e| PlaybackError::AdapterError(format!("adapter refused media: {}", e))),
            None => Ok(()),
        }
    }

    /// Reload the current media after an abandoned [`stage`](Self::stage).
    ///
    /// Resumes output at the cursor when playing. Best effort.
    pub fn unstage(&self) {
        let Some(media) = &self.media else {
            return;
        };
        self.adapter_call("load", |adapter| adapter.load(media));
        if self.state == PlaybackState::Playing {
            let position = self.current_time_secs();
            self.adapter_call("start", |adapter| adapter.start(position));
        }
    }

    /// Make staged `media` current and park the cursor at 0 in `Paused`.
    pub fn commit(&mut self, media: PlaybackMedia) {
        if self.state == PlaybackState::Playing {
            self.adapter_call("stop", |adapter| adapter.stop());
        }

        debug!(
            duration_secs = media.duration_secs,
            bytes = media.wav.len(),
            "Primed playback media"
        );
        self.media = Some(media);
        self.last_error = None;
        self.move_anchor(0.0);
        self.transition(PlaybackState::Paused);
    }

    /// Record a failed load and enter `Error`.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "Playback entered error state");
        if self.media.take().is_some() {
            self.adapter_call("unload", |adapter| adapter.unload());
        }
        self.move_anchor(0.0);
        self.emit(PlaybackEvent::Error {
            message: message.clone(),
        });
        self.last_error = Some(message);
        self.transition(PlaybackState::Error);
    }

    /// Back to `Idle`, dropping media.
    pub fn reset(&mut self) {
        if self.state == PlaybackState::Playing {
            self.adapter_call("stop", |adapter| adapter.stop());
        }
        if self.media.take().is_some() {
            self.adapter_call("unload", |adapter| adapter.unload());
        }
        self.last_error = None;
        self.move_anchor(0.0);
        self.transition(PlaybackState::Idle);
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start the cursor. Restarts from 0 when parked at the end.
    ///
    /// A no-op success while already playing.
    pub fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Paused => {}
            state => return Err(PlaybackError::InvalidState { verb: "play", state }),
        }

        let duration = self.duration_secs();
        let mut position = self.anchor.position_secs;
        if position >= duration {
            position = 0.0;
        }

        if let Some(adapter) = &self.adapter {
            adapter
                .start(position)
                .map_err(|e| PlaybackError::AdapterError(e.to_string()))?;
        }

        self.move_anchor(position);
        self.transition(PlaybackState::Playing);
        info!(position_secs = position, "Playback started");
        Ok(())
    }

    /// Freeze the cursor at its current position.
    ///
    /// A no-op success while already paused.
    pub fn pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Paused => return Ok(()),
            PlaybackState::Playing => {}
            state => return Err(PlaybackError::InvalidState { verb: "pause", state }),
        }

        if let Some(adapter) = &self.adapter {
            adapter
                .stop()
                .map_err(|e| PlaybackError::AdapterError(e.to_string()))?;
        }

        let position = self.current_time_secs();
        self.move_anchor(position);
        self.transition(PlaybackState::Paused);
        info!(position_secs = position, "Playback paused");
        Ok(())
    }

    /// Move the cursor to `percent` of the duration, keeping Playing/Paused.
    pub fn seek(&mut self, percent: f64) -> Result<()> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(PlaybackError::InvalidSeek(percent));
        }
        if !self.state.is_active() {
            return Err(PlaybackError::InvalidState {
                verb: "seek",
                state: self.state,
            });
        }

        let position = percent / 100.0 * self.duration_secs();

        if self.state == PlaybackState::Playing {
            if let Some(adapter) = &self.adapter {
                adapter
                    .start(position)
                    .map_err(|e| PlaybackError::AdapterError(e.to_string()))?;
            }
        }

        self.move_anchor(position);
        debug!(percent, position_secs = position, "Seeked");
        self.emit(PlaybackEvent::Seeked {
            percent,
            current_time_secs: position,
        });
        Ok(())
    }

    /// Advance the cadence: publish progress while playing and stop at the end.
    ///
    /// Returns the progress percent when playing, `None` otherwise.
    pub fn tick(&mut self) -> Option<f64> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let duration = self.duration_secs();
        let current = self.current_time_secs();

        if current >= duration {
            self.adapter_call("stop", |adapter| adapter.stop());
            self.move_anchor(duration);
            self.emit(PlaybackEvent::Progress {
                percent: 100.0,
                current_time_secs: duration,
                duration_secs: duration,
            });
            self.emit(PlaybackEvent::Ended {
                duration_secs: duration,
            });
            self.transition(PlaybackState::Paused);
            info!("Playback reached end");
            return Some(100.0);
        }

        let percent = self.progress_percent();
        self.emit(PlaybackEvent::Progress {
            percent,
            current_time_secs: current,
            duration_secs: duration,
        });
        Some(percent)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn move_anchor(&mut self, position_secs: f64) {
        self.anchor = Anchor {
            position_secs,
            clock_at: self.clock.monotonic(),
        };
    }

    fn transition(&mut self, next: PlaybackState) {
        let previous = self.state;
        self.state = next;
        if previous != next {
            debug!(from = %previous, to = %next, "Playback state changed");
            self.emit(PlaybackEvent::StateChanged {
                previous: previous.as_str().to_string(),
                current: next.as_str().to_string(),
            });
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            bus.emit(CoreEvent::Playback(event)).ok();
        }
    }

    /// Best-effort adapter command on teardown paths.
    fn adapter_call<F>(&self, command: &'static str, call: F)
    where
        F: FnOnce(&dyn PlaybackAdapter) -> Result<()>,
    {
        if let Some(adapter) = &self.adapter {
            if let Err(e) = call(adapter.as_ref()) {
                warn!(command, error = %e, "Playback adapter command failed");
            }
        }
    }
}
