//! # Edit Session
//!
//! Binds one loaded source to its current buffer, waveform, selection,
//! playback cursor and undo state.
//!
//! ## Overview
//!
//! - `load` decodes a source; the last request wins. Each call takes a new
//!   load token and a decode that resolves after a newer `load` started is
//!   dropped ([`LoadOutcome::Superseded`]).
//! - `apply_edit` runs a trim or silence insertion on the current buffer,
//!   regenerates peaks, encodes WAV, loads it into the output device and
//!   hands it to the sink. Nothing is replaced unless every step succeeds;
//!   the sink only sees edits the output device already accepted.
//! - `undo_to_original` restores the first decoded buffer (single level).
//! - Transport and pointer verbs forward to the playback and selection
//!   controllers.
//!
//! ## Locking
//!
//! All mutable state sits behind one `parking_lot::Mutex`. It is never held
//! across the decode `.await`, so transport verbs and the progress ticker
//! keep running while a source loads.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core_audio::{AudioSource, SilencePosition};
//! use core_service::{CoreService, EditOperation};
//! use core_runtime::EngineConfig;
//!
//! # async fn example() -> core_service::Result<()> {
//! let core = CoreService::new(EngineConfig::builder().build()?)?;
//! let session = core.new_session();
//!
//! session.load(AudioSource::local_file("take-3.mp3")).await?;
//! session.pointer_down(10.0)?;
//! session.pointer_move(60.0)?;
//! session.pointer_up()?;
//! session.apply_edit(EditOperation::Trim)?;
//! session.apply_edit(EditOperation::AddSilence {
//!     seconds: 0.5,
//!     position: SilencePosition::End,
//! })?;
//! # Ok(())
//! # }
//! ```

use crate::error::{CoreError, Result};
use crate::selection::{GestureOutcome, SelectionController, SelectionRange};
use bridge_traits::sink::EditedAudioSink;
use bridge_traits::time::Clock;
use core_audio::{
    add_silence_limited, trim, AudioDecoder, AudioSource, SampleBuffer, SilencePosition,
    WavEncoder, WaveformDownsampler, WaveformPeaks,
};
use core_playback::{
    PlaybackAdapter, PlaybackConfig, PlaybackController, PlaybackMedia, PlaybackState,
    ProgressSource,
};
use core_runtime::config::EditorSettings;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ============================================================================
// Public types
// ============================================================================

/// An edit on the current buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Keep only the committed selection.
    Trim,
    /// Insert `seconds` of silence at one edge.
    AddSilence {
        seconds: f64,
        position: SilencePosition,
    },
}

impl EditOperation {
    pub fn label(&self) -> &'static str {
        match self {
            EditOperation::Trim => "trim",
            EditOperation::AddSilence { .. } => "add_silence",
        }
    }
}

/// How a `load` call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The decoded source is now current.
    Loaded,
    /// A newer `load` started before this one finished; its result was dropped.
    Superseded { token: u64, latest: u64 },
}

/// Plain numeric state for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub load_token: u64,
    pub loading: bool,
    pub peaks: Vec<f32>,
    /// Divide peaks by this to fill the display height.
    pub display_scale: f32,
    pub playback_state: PlaybackState,
    pub progress_percent: f64,
    pub current_time_secs: f64,
    pub duration_secs: f64,
    /// Live drag or committed selection.
    pub selection: Option<SelectionRange>,
    /// `true` once an edit has replaced the first decode.
    pub is_edited: bool,
}

// ============================================================================
// Session
// ============================================================================

struct SessionState {
    original: Option<SampleBuffer>,
    current: Option<SampleBuffer>,
    peaks: WaveformPeaks,
    selection: SelectionController,
    playback: PlaybackController,
    /// Token of the latest load while its decode is outstanding.
    pending_load: Option<u64>,
}

impl SessionState {
    /// The current buffer, if the session can accept edits.
    fn editable(&self) -> Result<SampleBuffer> {
        if self.pending_load.is_some() {
            return Err(CoreError::LoadInProgress);
        }
        match &self.current {
            Some(buffer) if self.playback.state().is_active() => Ok(buffer.clone()),
            _ => Err(CoreError::NotLoaded),
        }
    }
}

pub struct EditSession {
    id: Uuid,
    decoder: Arc<dyn AudioDecoder>,
    sink: Arc<dyn EditedAudioSink>,
    clock: Arc<dyn Clock>,
    settings: EditorSettings,
    events: EventBus,
    load_token: AtomicU64,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("load_token", &self.load_token.load(Ordering::SeqCst))
            .finish()
    }
}

impl EditSession {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        sink: Arc<dyn EditedAudioSink>,
        clock: Arc<dyn Clock>,
        settings: EditorSettings,
        events: EventBus,
    ) -> Self {
        let playback = build_playback(&clock, &settings, &events, None);
        let selection =
            SelectionController::new(settings.min_drag_percent).with_event_bus(events.clone());

        Self {
            id: Uuid::new_v4(),
            decoder,
            sink,
            clock,
            settings,
            events,
            load_token: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                original: None,
                current: None,
                peaks: WaveformPeaks::default(),
                selection,
                playback,
                pending_load: None,
            }),
        }
    }

    /// Mirror transport to a host output device.
    pub fn with_playback_adapter(self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        let playback = build_playback(&self.clock, &self.settings, &self.events, Some(adapter));
        self.state.lock().playback = playback;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Token of the most recent `load` call (0 before any).
    pub fn load_token(&self) -> u64 {
        self.load_token.load(Ordering::SeqCst)
    }

    pub fn current_buffer(&self) -> Option<SampleBuffer> {
        self.state.lock().current.clone()
    }

    pub fn original_buffer(&self) -> Option<SampleBuffer> {
        self.state.lock().original.clone()
    }

    pub fn peaks(&self) -> WaveformPeaks {
        self.state.lock().peaks.clone()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.state.lock().selection.selection()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.lock().playback.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        let playback = state.playback.snapshot();
        let is_edited = match (&state.original, &state.current) {
            (Some(original), Some(current)) => !current.shares_storage_with(original),
            _ => false,
        };

        SessionSnapshot {
            session_id: self.id.to_string(),
            load_token: self.load_token(),
            loading: state.pending_load.is_some(),
            peaks: state.peaks.peaks().to_vec(),
            display_scale: state.peaks.display_scale(self.settings.peak_headroom),
            playback_state: playback.state,
            progress_percent: playback.progress_percent,
            current_time_secs: playback.current_time_secs,
            duration_secs: playback.duration_secs,
            selection: state.selection.visible_range(),
            is_edited,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Decode `source` and make it current, unless a newer load overtakes it.
    ///
    /// # Errors
    ///
    /// Decode-kind errors when the latest source cannot be read. Buffers and
    /// peaks keep their previous values; playback moves to `Error`.
    #[instrument(skip(self, source), fields(session_id = %self.id, source = %source.describe()))]
    pub async fn load(&self, source: AudioSource) -> Result<LoadOutcome> {
        let token = self.load_token.fetch_add(1, Ordering::SeqCst) + 1;
        let description = source.describe();

        {
            let mut state = self.state.lock();
            state.pending_load = Some(token);
            state.selection.clear();
            state.playback.begin_loading();
        }
        self.emit(SessionEvent::LoadStarted {
            session_id: self.id.to_string(),
            token,
            source: description,
        });
        debug!(token, "Decoding source");

        let decoded = self.decoder.decode(source).await;

        let mut state = self.state.lock();
        let latest = self.load_token.load(Ordering::SeqCst);
        if token != latest {
            debug!(token, latest, "Discarding stale decode");
            self.emit(SessionEvent::LoadSuperseded {
                session_id: self.id.to_string(),
                token,
                latest,
            });
            return Ok(LoadOutcome::Superseded { token, latest });
        }
        state.pending_load = None;

        let prepared = decoded.map_err(CoreError::from).and_then(|buffer| {
            let peaks = WaveformDownsampler::downsample(&buffer, self.settings.waveform_buckets);
            let media = playback_media(&buffer)?;
            Ok((buffer, peaks, media))
        });

        let (buffer, peaks, media) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(token, error = %e, "Load failed");
                state.playback.fail(e.to_string());
                self.emit(SessionEvent::LoadFailed {
                    session_id: self.id.to_string(),
                    token,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        state.playback.prime(media)?;
        state.original = Some(buffer.clone());
        state.current = Some(buffer.clone());
        state.peaks = peaks;

        info!(
            token,
            duration_secs = buffer.duration_secs(),
            sample_rate = buffer.sample_rate(),
            channels = buffer.channel_count(),
            "Source loaded"
        );
        self.emit(SessionEvent::Loaded {
            session_id: self.id.to_string(),
            token,
            duration_secs: buffer.duration_secs(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.channel_count() as u16,
        });
        self.emit_peaks(&state.peaks);

        Ok(LoadOutcome::Loaded)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Apply `operation` to the current buffer and deliver the result.
    ///
    /// All or nothing: on any error the buffer, peaks, selection and
    /// playback are unchanged.
    #[instrument(skip(self), fields(session_id = %self.id, operation = operation.label()))]
    pub fn apply_edit(&self, operation: EditOperation) -> Result<()> {
        let mut state = self.state.lock();

        match self.try_apply(&mut state, operation) {
            Ok(duration_secs) => {
                info!(duration_secs, "Edit applied");
                self.emit(SessionEvent::EditApplied {
                    session_id: self.id.to_string(),
                    operation: operation.label().to_string(),
                    duration_secs,
                });
                self.emit_peaks(&state.peaks);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Edit rejected");
                self.emit(SessionEvent::EditRejected {
                    session_id: self.id.to_string(),
                    operation: operation.label().to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn try_apply(&self, state: &mut SessionState, operation: EditOperation) -> Result<f64> {
        let current = state.editable()?;

        let edited = match operation {
            EditOperation::Trim => {
                let range = state
                    .selection
                    .selection()
                    .ok_or(CoreError::SelectionRequired { operation: "trim" })?;
                let (start, end) = range.to_seconds(current.duration_secs());
                trim(&current, start, end)?
            }
            EditOperation::AddSilence { seconds, position } => add_silence_limited(
                &current,
                seconds,
                position,
                self.settings.max_decoded_frames,
            )?,
        };

        let peaks = WaveformDownsampler::downsample(&edited, self.settings.waveform_buckets);
        let encoded = WavEncoder::encode_audio(&edited)?;
        let media = PlaybackMedia::new(
            encoded.data.clone(),
            edited.duration_secs(),
            edited.sample_rate(),
            edited.channel_count() as u16,
        );

        stage_or_restore(&state.playback, &media)?;
        if let Err(e) = self.sink.deliver(encoded) {
            state.playback.unstage();
            return Err(e.into());
        }

        let duration_secs = edited.duration_secs();
        state.current = Some(edited);
        state.peaks = peaks;
        state.selection.clear();
        state.playback.commit(media);

        Ok(duration_secs)
    }

    /// Restore the first decoded buffer and release the delivered edit.
    ///
    /// # Errors
    ///
    /// If the output device refuses the original or the sink fails to
    /// release, the edited buffer stays current.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn undo_to_original(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.editable()?;
        let original = state.original.clone().ok_or(CoreError::NotLoaded)?;

        let peaks = WaveformDownsampler::downsample(&original, self.settings.waveform_buckets);
        let media = playback_media(&original)?;

        stage_or_restore(&state.playback, &media)?;
        if let Err(e) = self.sink.release() {
            state.playback.unstage();
            return Err(e.into());
        }

        state.current = Some(original.clone());
        state.peaks = peaks;
        state.selection.clear();
        state.playback.commit(media);

        info!(duration_secs = original.duration_secs(), "Restored original audio");
        self.emit(SessionEvent::Restored {
            session_id: self.id.to_string(),
            duration_secs: original.duration_secs(),
        });
        self.emit_peaks(&state.peaks);
        Ok(())
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub fn play(&self) -> Result<()> {
        Ok(self.state.lock().playback.play()?)
    }

    pub fn pause(&self) -> Result<()> {
        Ok(self.state.lock().playback.pause()?)
    }

    pub fn seek(&self, percent: f64) -> Result<()> {
        Ok(self.state.lock().playback.seek(percent)?)
    }

    /// Advance the progress cadence. See [`PlaybackController::tick`].
    pub fn tick(&self) -> Option<f64> {
        self.state.lock().playback.tick()
    }

    // ========================================================================
    // Pointer gesture
    // ========================================================================

    pub fn pointer_down(&self, percent: f64) -> Result<SelectionRange> {
        let mut state = self.state.lock();
        state.editable()?;
        state.selection.begin(percent)
    }

    pub fn pointer_move(&self, percent: f64) -> Result<SelectionRange> {
        self.state.lock().selection.update(percent)
    }

    /// Release the pointer. A short drag seeks instead of selecting.
    pub fn pointer_up(&self) -> Result<GestureOutcome> {
        let mut state = self.state.lock();
        let outcome = state.selection.end()?;
        if let GestureOutcome::Seek(percent) = outcome {
            state.playback.seek(percent)?;
        }
        Ok(outcome)
    }

    pub fn clear_selection(&self) {
        self.state.lock().selection.clear();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn emit(&self, event: SessionEvent) {
        self.events.emit(CoreEvent::Session(event)).ok();
    }

    fn emit_peaks(&self, peaks: &WaveformPeaks) {
        self.emit(SessionEvent::PeaksUpdated {
            session_id: self.id.to_string(),
            bucket_count: peaks.len(),
            display_scale: peaks.display_scale(self.settings.peak_headroom),
        });
    }
}

impl ProgressSource for EditSession {
    fn tick(&self) -> Option<f64> {
        EditSession::tick(self)
    }
}

fn build_playback(
    clock: &Arc<dyn Clock>,
    settings: &EditorSettings,
    events: &EventBus,
    adapter: Option<Arc<dyn PlaybackAdapter>>,
) -> PlaybackController {
    let config = PlaybackConfig::default().with_progress_interval(settings.progress_interval());
    let controller = PlaybackController::new(Arc::clone(clock))
        .with_config(config)
        .with_event_bus(events.clone());
    match adapter {
        Some(adapter) => controller.with_adapter(adapter),
        None => controller,
    }
}

/// Load `media` into the output device, restoring the previous media if it
/// is refused.
fn stage_or_restore(playback: &PlaybackController, media: &PlaybackMedia) -> Result<()> {
    playback.stage(media).map_err(|e| {
        playback.unstage();
        CoreError::from(e)
    })
}

fn playback_media(buffer: &SampleBuffer) -> Result<PlaybackMedia> {
    let wav = WavEncoder::encode(buffer)?;
    Ok(PlaybackMedia::new(
        wav,
        buffer.duration_secs(),
        buffer.sample_rate(),
        buffer.channel_count() as u16,
    ))
}
