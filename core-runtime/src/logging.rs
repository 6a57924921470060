//! # Logging
//!
//! Installs the global `tracing` subscriber for an editor process and
//! optionally mirrors events to a host [`LoggerSink`].
//!
//! The subscriber is a registry with three layers: an [`EnvFilter`] built
//! from [`LoggingConfig`], one stdout formatter picked by [`LogFormat`], and
//! the host layer. Fields forwarded to the host are redacted: source URLs lose
//! their query string, paths are cut to the file name and credential-like
//! fields are masked.
//!
//! ```ignore
//! use bridge_traits::time::LogLevel;
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug)
//!         .with_logger_sink(host_logger),
//! )?;
//! ```
//!
//! Remote clips are usually presigned URLs whose query string is a
//! credential; log them through [`redact_source_url`].

use crate::error::{Error, Result};

use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer,
};

/// Workspace crates that follow the configured level by default.
const WORKSPACE_TARGETS: &[&str] = &[
    "voicecut_workspace",
    "core_runtime",
    "core_audio",
    "core_playback",
    "core_service",
    "bridge_desktop",
];

/// Dependencies that are only interesting when something is wrong.
const QUIET_TARGETS: &[&str] = &["symphonia", "h2", "hyper", "reqwest"];

/// Field names whose values are masked before reaching the host.
const CREDENTIAL_FIELDS: &[&str] = &[
    "token",
    "password",
    "secret",
    "api_key",
    "authorization",
    "signature",
    "cookie",
];

/// Stdout format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored; debug builds
    Pretty,
    /// One JSON object per event; release builds
    Json,
    /// Single line per event
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for workspace crates when no custom filter is set
    pub level: LogLevel,
    /// Full `EnvFilter` directive, replacing the level-based default
    pub filter: Option<String>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Redact fields forwarded to `logger_sink`
    pub redact_pii: bool,
    /// Report span enter/exit (pretty) or the span list (json)
    pub enable_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            redact_pii: true,
            enable_spans: true,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("has_logger_sink", &self.logger_sink.is_some())
            .field("redact_pii", &self.redact_pii)
            .field("enable_spans", &self.enable_spans)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_pii_redaction(mut self, redact: bool) -> Self {
        self.redact_pii = redact;
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// `Error::Config` if the filter does not parse or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let spans = config.enable_spans;

    let pretty = (config.format == LogFormat::Pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(if spans { FmtSpan::ACTIVE } else { FmtSpan::NONE })
            .with_writer(io::stdout)
    });
    let json = (config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(spans)
            .with_span_list(spans)
            .with_writer(io::stdout)
    });
    let compact = (config.format == LogFormat::Compact).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stdout)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(compact)
        .with(HostLogLayer::new(config.logger_sink, config.redact_pii))
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

fn default_filter_string(level: LogLevel) -> String {
    let level = level_name(level);
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = config
        .filter
        .clone()
        .unwrap_or_else(|| default_filter_string(config.level));

    EnvFilter::try_new(directives).map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

// ============================================================================
// Host layer
// ============================================================================

/// Mirrors events at or above the sink's level to a `LoggerSink`.
struct HostLogLayer {
    sink: Option<Arc<dyn LoggerSink>>,
    redact: bool,
}

impl HostLogLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>, redact: bool) -> Self {
        Self { sink, redact }
    }

    fn entry_for<S>(&self, event: &Event<'_>, level: LogLevel, ctx: &Context<'_, S>) -> LogEntry
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let metadata = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let message = fields
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);
        for (name, value) in fields.values {
            let value = if self.redact {
                redact_field(&name, &value)
            } else {
                value
            };
            entry = entry.with_field(name, value);
        }
        entry.span = ctx.lookup_current().map(|span| span.name().to_string());
        entry
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let level = log_level(*event.metadata().level());
        if level < sink.min_level() {
            return;
        }

        let entry = self.entry_for(event, level, &ctx);
        let sink = Arc::clone(sink);

        // Inside a runtime the sink runs as a task; elsewhere inline.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sink.log(entry).await {
                        eprintln!("LoggerSink error: {}", e);
                    }
                });
            }
            Err(_) => {
                if let Err(e) = futures::executor::block_on(sink.log(entry)) {
                    eprintln!("LoggerSink error: {}", e);
                }
            }
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    values: HashMap<String, String>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{:?}", value));
    }
}

impl FieldCollector {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

fn log_level(level: tracing::Level) -> LogLevel {
    match level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

// ============================================================================
// Redaction
// ============================================================================

fn redact_field(name: &str, value: &str) -> String {
    let name = name.to_lowercase();
    if name.contains("url") || name == "source" {
        redact_source_url(value)
    } else if name == "path" || name.ends_with("_path") {
        strip_path(value).to_string()
    } else {
        redact_if_sensitive(&name, value)
    }
}

/// `[REDACTED]` if `field_name` looks like a credential, else `value`.
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    let name = field_name.to_lowercase();
    if CREDENTIAL_FIELDS.iter().any(|credential| name.contains(credential)) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

/// Drop the query string, fragment and userinfo of a source URL
///
/// ```
/// use core_runtime::logging::redact_source_url;
///
/// assert_eq!(
///     redact_source_url("https://cdn.example.com/vo/line-12.mp3?X-Amz-Signature=abc"),
///     "https://cdn.example.com/vo/line-12.mp3?[REDACTED]"
/// );
/// ```
pub fn redact_source_url(url: &str) -> String {
    let cut = url.find(['?', '#']);
    let base = cut.map_or(url, |pos| &url[..pos]);

    let base = match base.split_once("://") {
        Some((scheme, rest)) => {
            let authority_end = rest.find('/').unwrap_or(rest.len());
            match rest[..authority_end].rfind('@') {
                Some(at) => format!("{}://[REDACTED]@{}", scheme, &rest[at + 1..]),
                None => base.to_string(),
            }
        }
        None => base.to_string(),
    };

    match cut {
        Some(_) => format!("{}?[REDACTED]", base),
        None => base,
    }
}

/// File name of a local path, for either separator.
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as SinkResult;
    use std::sync::Mutex;

    struct CapturingSink {
        entries: Mutex<Vec<LogEntry>>,
        min_level: LogLevel,
    }

    impl CapturingSink {
        fn at(min_level: LogLevel) -> Arc<Self> {
            Arc::new(Self {
                entries: Mutex::new(Vec::new()),
                min_level,
            })
        }
    }

    #[async_trait]
    impl LoggerSink for CapturingSink {
        async fn log(&self, entry: LogEntry) -> SinkResult<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        fn min_level(&self) -> LogLevel {
            self.min_level
        }
    }

    #[test]
    fn test_default_format_follows_build() {
        let expected = if cfg!(debug_assertions) {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        assert_eq!(LogFormat::default(), expected);
    }

    #[test]
    fn test_default_filter_quiets_dependencies() {
        let filter = default_filter_string(LogLevel::Debug);
        assert!(filter.contains("core_audio=debug"));
        assert!(filter.contains("core_service=debug"));
        assert!(filter.contains("symphonia=warn"));
        assert!(filter.contains("reqwest=warn"));
        assert!(build_filter(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_custom_filter_replaces_default() {
        let config = LoggingConfig::default().with_filter("core_audio=trace");
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("core_audio=trace"));
        assert!(!filter.to_string().contains("symphonia"));
    }

    #[test]
    fn test_redact_source_url() {
        assert_eq!(
            redact_source_url("https://cdn.example.com/a.mp3?sig=1&exp=2"),
            "https://cdn.example.com/a.mp3?[REDACTED]"
        );
        assert_eq!(
            redact_source_url("https://user:pw@cdn.example.com/a.mp3"),
            "https://[REDACTED]@cdn.example.com/a.mp3"
        );
        assert_eq!(
            redact_source_url("https://cdn.example.com/a.mp3#t=3"),
            "https://cdn.example.com/a.mp3?[REDACTED]"
        );
        assert_eq!(
            redact_source_url("https://cdn.example.com/a.mp3"),
            "https://cdn.example.com/a.mp3"
        );
    }

    #[test]
    fn test_strip_path() {
        assert_eq!(strip_path("/home/jo/vo/line.wav"), "line.wav");
        assert_eq!(strip_path("C:\\Users\\Jo\\vo\\line.wav"), "line.wav");
        assert_eq!(strip_path("/var/log/"), "");
    }

    #[test]
    fn test_host_layer_forwards_redacted_event() {
        let sink = CapturingSink::at(LogLevel::Trace);
        let host: Arc<dyn LoggerSink> = sink.clone();
        let subscriber = tracing_subscriber::registry().with(HostLogLayer::new(Some(host), true));
        let _guard = tracing::subscriber::set_default(subscriber);

        let span = tracing::info_span!("load");
        span.in_scope(|| {
            tracing::info!(
                target: "core_audio::decoder",
                frames = 16000u64,
                source_url = "https://cdn.example.com/a.mp3?sig=1",
                export_path = "/home/jo/out/clip.wav",
                "clip decoded"
            );
        });

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.target, "core_audio::decoder");
        assert_eq!(entry.message, "clip decoded");
        assert_eq!(entry.span.as_deref(), Some("load"));
        assert_eq!(entry.fields["frames"], "16000");
        assert_eq!(
            entry.fields["source_url"],
            "https://cdn.example.com/a.mp3?[REDACTED]"
        );
        assert_eq!(entry.fields["export_path"], "clip.wav");
    }

    #[test]
    fn test_host_layer_respects_min_level() {
        let sink = CapturingSink::at(LogLevel::Warn);
        let host: Arc<dyn LoggerSink> = sink.clone();
        let subscriber =
            tracing_subscriber::registry().with(HostLogLayer::new(Some(host), false));
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::info!("ignored");
        tracing::warn!("kept");

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
    }
}
