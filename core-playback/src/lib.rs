//! # Core Playback Module
//!
//! Transport control for edited clips.
//!
//! ## Overview
//!
//! This crate handles:
//! - The play/pause/seek state machine ([`PlaybackController`])
//! - A clock-anchored time cursor, testable with a manual clock
//! - Fixed-cadence progress publication ([`ProgressTicker`])
//! - An optional host output device ([`PlaybackAdapter`])
//!
//! Decoding and encoding live in `core-audio`; this crate only sees the
//! encoded WAV and its duration.

pub mod config;
pub mod controller;
pub mod error;
pub mod ticker;
pub mod traits;

pub use config::{PlaybackConfig, PlaybackState};
pub use controller::{Anchor, PlaybackController, PlaybackSnapshot};
pub use error::{PlaybackError, Result};
pub use ticker::{ProgressSource, ProgressTicker};
pub use traits::{PlaybackAdapter, PlaybackMedia};
