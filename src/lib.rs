//! Workspace facade crate.
//!
//! This crate exposes shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-audio`, `core-playback`,
//! `core-runtime`). Host applications can depend on `voicecut-workspace` and
//! enable the documented features without wiring each crate individually.
//!
//! ## Features
//!
//! - `desktop-shims` (default): reqwest HTTP client and downloads-folder
//!   export sink as bridge defaults.

pub use bridge_traits as bridge;
pub use core_audio as audio;
pub use core_playback as playback;
pub use core_runtime as runtime;

pub use core_service::{
    CoreError, CoreService, EditOperation, EditSession, GestureOutcome, LoadOutcome, Result,
    SelectionRange, SessionSnapshot,
};
