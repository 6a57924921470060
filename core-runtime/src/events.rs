//! # Event Bus System
//!
//! Provides an event-driven architecture for the editing core using `tokio::sync::broadcast`.
//! Renderers and host shells observe sessions, playback and selection through typed
//! events instead of polling.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for different domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    emit      ┌───────────┐
//! │ EditSession  ├─────────────>│           │
//! └──────────────┘              │           │
//!                               │ EventBus  │
//! ┌──────────────┐    emit      │ (broadcast│     subscribe    ┌────────────┐
//! │ Playback     ├─────────────>│  channel) ├─────────────────>│ Renderer   │
//! └──────────────┘              │           │                  └────────────┘
//!                               │           │
//! ┌──────────────┐    emit      │           │     subscribe    ┌────────────┐
//! │ Selection    ├─────────────>│           ├─────────────────>│ Host shell │
//! └──────────────┘              └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut progress = EventStream::new(event_bus.subscribe())
//!     .filter(|event| matches!(event, CoreEvent::Playback(PlaybackEvent::Progress { .. })));
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::Progress {
//!         percent: 50.0,
//!         current_time_secs: 1.0,
//!         duration_secs: 2.0,
//!     }))
//!     .ok();
//!
//! let event = progress.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback progress");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Progress events are emitted at ~60 Hz, so slow renderers will see this; it
//!   is non-fatal.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns an error that producers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Source loading and edit lifecycle
    Session(SessionEvent),
    /// Transport state and progress
    Playback(PlaybackEvent),
    /// Pointer gesture results
    Selection(SelectionEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Selection(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Session(SessionEvent::EditRejected { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::LoadSuperseded { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::Loaded { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::EditApplied { .. }) => EventSeverity::Info,
            CoreEvent::Session(SessionEvent::Restored { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Events related to loading sources and applying edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A decode was requested.
    LoadStarted {
        session_id: String,
        /// Load token assigned to this request.
        token: u64,
        /// Redacted description of the source.
        source: String,
    },
    /// The latest requested source finished decoding and is now current.
    Loaded {
        session_id: String,
        token: u64,
        duration_secs: f64,
        sample_rate: u32,
        channels: u16,
    },
    /// A decode resolved after a newer load was requested; its result was dropped.
    LoadSuperseded {
        session_id: String,
        /// Token of the discarded request.
        token: u64,
        /// Token of the newest request.
        latest: u64,
    },
    /// The latest requested source failed to decode.
    LoadFailed {
        session_id: String,
        token: u64,
        message: String,
    },
    /// An edit was applied and delivered to the sink.
    EditApplied {
        session_id: String,
        /// Short operation label (`trim`, `add_silence`).
        operation: String,
        /// Duration of the new current buffer.
        duration_secs: f64,
    },
    /// An edit was refused; session state is unchanged.
    EditRejected {
        session_id: String,
        operation: String,
        message: String,
    },
    /// The current buffer was restored to the first decode.
    Restored {
        session_id: String,
        duration_secs: f64,
    },
    /// Waveform peaks were regenerated.
    PeaksUpdated {
        session_id: String,
        bucket_count: usize,
        /// Renderer divisor (`max_peak * headroom`, or 1.0 for silence).
        display_scale: f32,
    },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::LoadStarted { .. } => "Audio load started",
            SessionEvent::Loaded { .. } => "Audio loaded",
            SessionEvent::LoadSuperseded { .. } => "Stale audio load discarded",
            SessionEvent::LoadFailed { .. } => "Audio load failed",
            SessionEvent::EditApplied { .. } => "Edit applied",
            SessionEvent::EditRejected { .. } => "Edit rejected",
            SessionEvent::Restored { .. } => "Original audio restored",
            SessionEvent::PeaksUpdated { .. } => "Waveform updated",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to the playback cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Transport state changed (`idle`, `loading`, `playing`, `paused`, `error`).
    StateChanged { previous: String, current: String },
    /// Periodic cursor update, emitted only while playing.
    Progress {
        percent: f64,
        current_time_secs: f64,
        duration_secs: f64,
    },
    /// Cursor moved by an explicit seek.
    Seeked { percent: f64, current_time_secs: f64 },
    /// The cursor reached the end of the buffer; playback paused there.
    Ended { duration_secs: f64 },
    /// A transport verb was rejected or priming failed.
    Error { message: String },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Progress { .. } => "Playback progress",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::Ended { .. } => "Playback reached end",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Selection Events
// ============================================================================

/// Events produced by the pointer-drag gesture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SelectionEvent {
    /// The in-progress drag range changed.
    Changed { start_percent: f64, end_percent: f64 },
    /// The drag ended with a range wide enough to keep.
    Committed { start_percent: f64, end_percent: f64 },
    /// Any selection was dropped.
    Cleared,
    /// The drag was too short and became a seek.
    SeekRequested { percent: f64 },
}

impl SelectionEvent {
    fn description(&self) -> &str {
        match self {
            SelectionEvent::Changed { .. } => "Selection changed",
            SelectionEvent::Committed { .. } => "Selection committed",
            SelectionEvent::Cleared => "Selection cleared",
            SelectionEvent::SeekRequested { .. } => "Seek requested from pointer",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new event bus with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every event currently buffered that passes the filter.
    ///
    /// Lag notifications are skipped.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            if let Ok(event) = result {
                events.push(event);
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
