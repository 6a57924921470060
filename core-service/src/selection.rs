//! # Selection Controller
//!
//! Turns a pointer drag over the waveform into a committed time range.
//!
//! ## Gesture
//!
//! ```text
//! idle ──begin(p)──▶ dragging ──end()──▶ committed   (|range| >= min_drag)
//!                       │  ▲
//!                  update(p) begin(p)            ──▶ idle + seek (short drag)
//! ```
//!
//! Positions are percentages of the clip in `[0, 100]`; values outside are
//! clamped and non-finite values rejected. A `begin` while dragging or
//! committed starts a fresh gesture.

use crate::error::{CoreError, Result};
use core_runtime::events::{CoreEvent, EventBus, SelectionEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default minimum drag width in percent.
pub const DEFAULT_MIN_DRAG_PERCENT: f64 = 0.5;

/// A span of the clip in percent, `start_percent <= end_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start_percent: f64,
    pub end_percent: f64,
}

impl SelectionRange {
    /// Ordered range from two positions.
    pub fn between(a: f64, b: f64) -> Self {
        Self {
            start_percent: a.min(b),
            end_percent: a.max(b),
        }
    }

    pub fn width_percent(&self) -> f64 {
        self.end_percent - self.start_percent
    }

    /// `(start, end)` in seconds for a clip of `duration_secs`.
    pub fn to_seconds(&self, duration_secs: f64) -> (f64, f64) {
        (
            self.start_percent / 100.0 * duration_secs,
            self.end_percent / 100.0 * duration_secs,
        )
    }
}

/// Where the gesture currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPhase {
    Idle,
    Dragging {
        anchor: f64,
        pointer: f64,
    },
    Committed(SelectionRange),
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// The drag was wide enough to keep.
    Committed(SelectionRange),
    /// The drag was too short; move the cursor here instead.
    Seek(f64),
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    phase: SelectionPhase,
    min_drag_percent: f64,
    events: Option<EventBus>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DRAG_PERCENT)
    }
}

impl SelectionController {
    pub fn new(min_drag_percent: f64) -> Self {
        Self {
            phase: SelectionPhase::Idle,
            min_drag_percent,
            events: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn min_drag_percent(&self) -> f64 {
        self.min_drag_percent
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, SelectionPhase::Dragging { .. })
    }

    /// The committed range, if any.
    pub fn selection(&self) -> Option<SelectionRange> {
        match self.phase {
            SelectionPhase::Committed(range) => Some(range),
            _ => None,
        }
    }

    /// Range to highlight: the live drag or the committed selection.
    pub fn visible_range(&self) -> Option<SelectionRange> {
        match self.phase {
            SelectionPhase::Idle => None,
            SelectionPhase::Dragging { anchor, pointer } => {
                Some(SelectionRange::between(anchor, pointer))
            }
            SelectionPhase::Committed(range) => Some(range),
        }
    }

    /// Pointer down: anchor a new gesture at `position`.
    pub fn begin(&mut self, position: f64) -> Result<SelectionRange> {
        let position = normalize(position)?;
        if self.is_dragging() {
            debug!(position, "Restarting selection gesture");
        }
        self.phase = SelectionPhase::Dragging {
            anchor: position,
            pointer: position,
        };
        let range = SelectionRange::between(position, position);
        self.emit(SelectionEvent::Changed {
            start_percent: range.start_percent,
            end_percent: range.end_percent,
        });
        Ok(range)
    }

    /// Pointer move: stretch the range from the anchor to `position`.
    pub fn update(&mut self, position: f64) -> Result<SelectionRange> {
        let position = normalize(position)?;
        let anchor = match self.phase {
            SelectionPhase::Dragging { anchor, .. } => anchor,
            _ => return Err(no_drag("update")),
        };
        self.phase = SelectionPhase::Dragging {
            anchor,
            pointer: position,
        };
        let range = SelectionRange::between(anchor, position);
        self.emit(SelectionEvent::Changed {
            start_percent: range.start_percent,
            end_percent: range.end_percent,
        });
        Ok(range)
    }

    /// Pointer up: commit the range, or turn a short drag into a seek.
    pub fn end(&mut self) -> Result<GestureOutcome> {
        let (anchor, pointer) = match self.phase {
            SelectionPhase::Dragging { anchor, pointer } => (anchor, pointer),
            _ => return Err(no_drag("end")),
        };

        let range = SelectionRange::between(anchor, pointer);
        if range.width_percent() < self.min_drag_percent {
            self.phase = SelectionPhase::Idle;
            debug!(percent = pointer, "Short drag treated as seek");
            self.emit(SelectionEvent::SeekRequested { percent: pointer });
            return Ok(GestureOutcome::Seek(pointer));
        }

        self.phase = SelectionPhase::Committed(range);
        debug!(
            start_percent = range.start_percent,
            end_percent = range.end_percent,
            "Selection committed"
        );
        self.emit(SelectionEvent::Committed {
            start_percent: range.start_percent,
            end_percent: range.end_percent,
        });
        Ok(GestureOutcome::Committed(range))
    }

    /// Drop any drag or committed selection.
    pub fn clear(&mut self) {
        if self.phase != SelectionPhase::Idle {
            self.phase = SelectionPhase::Idle;
            self.emit(SelectionEvent::Cleared);
        }
    }

    fn emit(&self, event: SelectionEvent) {
        if let Some(bus) = &self.events {
            bus.emit(CoreEvent::Selection(event)).ok();
        }
    }
}

fn normalize(position: f64) -> Result<f64> {
    if !position.is_finite() {
        return Err(CoreError::InvalidGesture(format!(
            "pointer position is not a number: {}",
            position
        )));
    }
    Ok(position.clamp(0.0, 100.0))
}

fn no_drag(verb: &str) -> CoreError {
    CoreError::InvalidGesture(format!("cannot {} without a drag in progress", verb))
}
