//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, with retry and exponential backoff
//! - `EditedAudioSink` writing WAV files to disk
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileExportSink, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new();
//! let sink = FileExportSink::in_downloads("voice-over-edit");
//! // Use in core configuration
//! ```

mod export;
mod http;

pub use export::FileExportSink;
pub use http::ReqwestHttpClient;
