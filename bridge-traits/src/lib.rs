//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the audio editing core and
//! platform-specific implementations. Each trait represents a capability that
//! the core requires but that must be implemented differently per platform
//! (desktop, mobile, web).
//!
//! ## Traits
//!
//! ### Input
//! - [`HttpClient`](http::HttpClient) - Fetch remote audio sources with retry and TLS
//!
//! ### Output
//! - [`EditedAudioSink`](sink::EditedAudioSink) - Receives the encoded WAV of every accepted edit
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Monotonic time source driving the playback cursor
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Mobile   | TBD                 | 📋 Planned |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! let sink = builder.sink
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "EditedAudioSink".to_string(),
//!         message: "No sink provided for edited audio.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations should convert platform-specific errors to
//! `BridgeError` and include context such as file paths or status codes.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared between the
//! UI dispatcher, the progress ticker and pending loads.

pub mod error;
pub mod http;
pub mod sink;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use sink::{EditedAudioSink, EncodedAudio};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
