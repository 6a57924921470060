//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the editing core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the audio, playback and
//! service crates depend on. It establishes the logging conventions, the
//! configuration surface and the event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{EditorSettings, EngineConfig, EngineConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use events::{CoreEvent, EventBus, EventStream};
